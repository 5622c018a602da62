//! # BrEconomy Data
//!
//! 지표 갱신 파이프라인과 조회 경로가 사용하는 외부 협력자를 제공합니다.
//!
//! - **storage**: 이름 기준 upsert 저장소 (PostgreSQL, 인메모리)와 만료 캐시 (Redis, 인메모리)
//! - **provider**: 중앙은행 SGS 시계열 HTTP 클라이언트

pub mod error;
pub mod provider;
pub mod storage;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use error::{DataError, Result};
pub use provider::{BcbClient, SeriesSource};
pub use storage::{
    connect_cache, connect_store, Database, IndicatorCache, IndicatorStore, KeyValueCache,
    MemoryCache, MemoryIndicatorStore, PgIndicatorStore, RedisCache,
};
