//! 경제 지표 갱신 작업.
//!
//! 이 crate는 지표별 백그라운드 갱신 작업과 독립 실행 CLI를 제공합니다:
//! - 업스트림 조회 → 검증 → 저장소 upsert → 캐시 기록
//! - 지표마다 하나의 취소 가능한 반복 작업
//! - API 서버 프로세스 안에서도, `breconomy-collector daemon`으로도 실행

pub mod config;
pub mod error;
pub mod modules;
pub mod stats;

pub use config::RefreshJobConfig;
pub use error::{CollectorError, Result};
pub use modules::{
    run_cycle, run_refresh_job, spawn_refresh_jobs, CycleOutcome, RefreshDeps, RefreshScheduler,
    SkipReason,
};
pub use stats::RefreshStats;
