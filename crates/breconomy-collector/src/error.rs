//! 에러 타입 정의.

use breconomy_core::CoreError;
use breconomy_data::DataError;
use thiserror::Error;

/// Collector 에러 타입
#[derive(Debug, Error)]
pub enum CollectorError {
    /// 저장소/캐시/업스트림 에러
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// 설정 에러
    #[error("Configuration error: {0}")]
    Config(String),

    /// 카탈로그에 없는 지표
    #[error("Unknown indicator: {0}")]
    UnknownIndicator(String),
}

impl From<CoreError> for CollectorError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownIndicator(name) => Self::UnknownIndicator(name),
            other => Self::Config(other.to_string()),
        }
    }
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, CollectorError>;
