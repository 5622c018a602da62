//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/` - 서비스 정보
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/api/v1/indicators` - 지표 목록 및 최신 값 조회

pub mod health;
pub mod indicators;

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use indicators::{
    indicators_router, DataSource, IndicatorListItem, IndicatorListResponse, IndicatorReading,
    DATA_SOURCE_HEADER,
};

/// 루트 경로 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    /// 주요 엔드포인트 경로
    pub endpoints: Vec<String>,
}

/// 서비스 정보.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "서비스 정보", body = ServiceInfo)),
    tag = "health"
)]
pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: "BrEconomy API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: "Indicadores econômicos do Brasil (SELIC, CDI, IPCA, Dólar)".to_string(),
        endpoints: vec![
            "/api/v1/indicators".to_string(),
            "/api/v1/indicators/{indicator_type}".to_string(),
            "/api/v1/indicators/{indicator_type}/{window}".to_string(),
            "/health".to_string(),
            "/health/ready".to_string(),
        ],
    })
}

/// 서비스 정보와 헬스 체크 라우트. rate limiting 대상이 아닙니다.
pub fn service_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(service_info))
        .nest("/health", health_router())
}

/// `/api/v1/indicators` 아래 지표 라우트.
pub fn indicator_api_router() -> Router<Arc<AppState>> {
    Router::new().nest("/api/v1/indicators", indicators_router())
}

/// 모든 API 라우트를 조합합니다.
pub fn create_api_router() -> Router<Arc<AppState>> {
    service_router().merge(indicator_api_router())
}
