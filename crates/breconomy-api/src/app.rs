//! 전체 라우터 조립.
//!
//! API 라우트에 rate limiting, HTTP 메트릭, 트레이싱, 타임아웃, CORS 레이어를
//! 얹고 `/metrics`와 Swagger UI를 합칩니다.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    middleware,
    routing::get,
    Router,
};
use breconomy_core::AppConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::middleware::{metrics_layer, rate_limit_middleware, RateLimitState};
use crate::openapi::swagger_ui_router;
use crate::routes::{indicator_api_router, service_router};
use crate::state::AppState;

/// /metrics 엔드포인트 핸들러.
async fn metrics_handler(State(handle): State<PrometheusHandle>) -> String {
    handle.render()
}

/// CORS 레이어.
///
/// `CORS_ORIGINS`(쉼표 구분)가 있으면 해당 origin만, 없으면 모두 허용합니다.
/// 조회 전용 API이므로 GET/OPTIONS만 허용합니다.
pub fn cors_layer() -> CorsLayer {
    let allow_origin = match std::env::var("CORS_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        _ => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}

/// 전체 라우터 생성.
///
/// rate limiting이 켜져 있으면 생성한 상태를 함께 돌려줍니다 (정리 태스크용).
pub fn create_router(
    state: Arc<AppState>,
    metrics_handle: PrometheusHandle,
    config: &AppConfig,
) -> (Router, Option<RateLimitState>) {
    // 메트릭 라우터 (별도 상태, Rate Limit 제외)
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    // rate limiting은 지표 라우트에만 적용
    let (indicator_router, rate_limit_state) = if config.rate_limit.enabled {
        let rate_limit_state = RateLimitState::new((&config.rate_limit).into());
        info!(
            window_secs = config.rate_limit.window_secs,
            max_requests = config.rate_limit.max_requests,
            "Rate limiting configured"
        );
        let router = indicator_api_router().route_layer(middleware::from_fn_with_state(
            rate_limit_state.clone(),
            rate_limit_middleware,
        ));
        (router, Some(rate_limit_state))
    } else {
        info!("Rate limiting DISABLED");
        (indicator_api_router(), None)
    };

    let api_router = service_router().merge(indicator_router).with_state(state);

    let router = Router::new()
        .merge(metrics_router)
        .merge(api_router)
        .merge(swagger_ui_router())
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.server.request_timeout_secs),
        ))
        .layer(cors_layer());

    (router, rate_limit_state)
}
