//! OpenAPI 문서화 설정.
//!
//! Swagger UI는 `/swagger-ui`, 스펙 JSON은 `/api-docs/openapi.json`에서 제공합니다.
//! 엔드포인트를 추가하면 `paths(...)`와 `components(schemas(...))`에도 등록합니다.

use axum::Router;
use breconomy_core::{IndicatorType, Window};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ApiErrorResponse;
use crate::routes::{
    ComponentHealth, ComponentStatus, HealthResponse, IndicatorListItem, IndicatorListResponse,
    IndicatorReading, ServiceInfo,
};

/// BrEconomy API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "BrEconomy API",
        description = r#"
# 브라질 경제 지표 REST API

중앙은행(BCB) SGS 시계열에서 주기적으로 수집한 최신 지표 값을 제공합니다.

- **SELIC**: 기준금리
- **CDI**: 연초 대비 / 최근 12개월 누적
- **IPCA**: 연초 대비 / 최근 12개월 누적
- **Dólar**: 달러 환율

응답 헤더 `x-data-source`는 값이 캐시(`cache`)와 저장소(`database`) 중 어디서 왔는지 알려줍니다.
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "로컬 개발 서버"),
    ),
    tags(
        (name = "health", description = "헬스 체크 - 서버 및 의존성 상태"),
        (name = "indicators", description = "지표 - 최신 값 조회")
    ),
    components(
        schemas(
            HealthResponse,
            ComponentHealth,
            ComponentStatus,
            ServiceInfo,
            ApiErrorResponse,
            IndicatorReading,
            IndicatorListItem,
            IndicatorListResponse,
            IndicatorType,
            Window,
        )
    ),
    paths(
        crate::routes::service_info,
        crate::routes::health::health_check,
        crate::routes::health::health_ready,
        crate::routes::indicators::list_indicators,
        crate::routes::indicators::get_indicator,
        crate::routes::indicators::get_indicator_window,
    )
)]
pub struct ApiDoc;

/// Swagger UI 라우터.
pub fn swagger_ui_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_valid() {
        let json = serde_json::to_string_pretty(&ApiDoc::openapi()).unwrap();

        assert!(json.contains("BrEconomy API"));
        assert!(json.contains("/health/ready"));
        assert!(json.contains("/api/v1/indicators/{indicator_type}/{window}"));
    }

    #[test]
    fn test_openapi_contains_schemas() {
        let json = serde_json::to_string(&ApiDoc::openapi()).unwrap();

        assert!(json.contains("IndicatorReading"));
        assert!(json.contains("ApiErrorResponse"));
        assert!(json.contains("HealthResponse"));
    }

    #[test]
    fn test_swagger_ui_router_creates() {
        let _router: Router<()> = swagger_ui_router();
    }
}
