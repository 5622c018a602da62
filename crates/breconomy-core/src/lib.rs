//! # BrEconomy Core
//!
//! 경제 지표 수집/조회 시스템의 핵심 도메인 모델과 타입을 제공합니다.
//!
//! 이 크레이트는 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - 지표 레코드 및 캐시 스냅샷
//! - 지표 카탈로그 (SELIC, CDI, IPCA, 달러)
//! - 엄격한 `DD/MM/YYYY` 날짜 및 불변 형식 소수 파싱
//! - 설정 관리
//! - 로깅 인프라

pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod parse;
pub mod types;

pub use catalog::*;
pub use config::*;
pub use error::*;
pub use logging::*;
pub use parse::*;
pub use types::*;
