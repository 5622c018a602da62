//! 핵심 에러 타입.

use thiserror::Error;

/// 도메인 수준 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// `DD/MM/YYYY` 형식이 아니거나 존재하지 않는 날짜
    #[error("잘못된 기준일: {raw:?}")]
    InvalidDate { raw: String },

    /// 불변 형식 소수로 해석할 수 없는 값
    #[error("잘못된 지표 값: {raw:?}")]
    InvalidValue { raw: String },

    /// 카탈로그에 없는 지표 유형 또는 기간
    #[error("알 수 없는 지표: {0}")]
    UnknownIndicator(String),
}

/// 핵심 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}
