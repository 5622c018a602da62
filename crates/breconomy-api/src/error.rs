//! 통합 API 에러 응답 타입.
//!
//! 모든 엔드포인트가 같은 `{code, message}` 형식으로 실패를 돌려줍니다.
//! 내부 오류 내용은 로그에만 남기고 응답 본문에는 싣지 않습니다.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 데이터가 아직 적재되지 않은 지표.
pub const INDICATOR_NOT_LOADED: &str = "INDICATOR_NOT_LOADED";
/// 카탈로그에 없는 유형/기간 조합.
pub const UNKNOWN_INDICATOR: &str = "UNKNOWN_INDICATOR";
/// 저장소 장애 등 내부 오류.
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";

/// 통합 API 에러 응답.
///
/// ```json
/// {
///   "code": "INDICATOR_NOT_LOADED",
///   "message": "No data loaded yet for indicator SELIC"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "INDICATOR_NOT_LOADED", "UNKNOWN_INDICATOR")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
}

impl ApiErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// 핸들러 결과 타입.
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiErrorResponse>)>;

/// 404: 아직 갱신 작업이 한 번도 성공하지 않은 지표.
pub fn not_loaded(name: &str) -> (StatusCode, Json<ApiErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiErrorResponse::new(
            INDICATOR_NOT_LOADED,
            format!("No data loaded yet for indicator {}", name),
        )),
    )
}

/// 400: 카탈로그에 없는 지표.
pub fn unknown_indicator(raw: &str) -> (StatusCode, Json<ApiErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiErrorResponse::new(
            UNKNOWN_INDICATOR,
            format!("Unknown indicator: {}", raw),
        )),
    )
}

/// 500: 일반 메시지만 노출합니다.
pub fn internal_error() -> (StatusCode, Json<ApiErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiErrorResponse::new(
            INTERNAL_ERROR,
            "Internal server error",
        )),
    )
}
