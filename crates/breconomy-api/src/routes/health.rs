//! 헬스 체크 endpoint.
//!
//! 로드밸런서나 오케스트레이션 시스템(Kubernetes 등)에서 사용됩니다.
//! `/health`는 프로세스 생존만, `/health/ready`는 저장소/캐시/업스트림을 각각 점검합니다.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use breconomy_core::{find_indicator, IndicatorType, Window};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

/// 캐시 읽기/쓰기 점검 키.
const CACHE_PROBE_KEY: &str = "health:probe";
const CACHE_PROBE_TTL: Duration = Duration::from_secs(10);

/// 헬스 체크 응답 구조체.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// 전체 서비스 상태 ("healthy" | "unhealthy")
    pub status: String,

    /// API 버전
    pub version: String,

    /// 서버 업타임(초)
    pub uptime_secs: i64,

    /// 현재 시간 (ISO 8601)
    pub timestamp: String,

    /// 개별 컴포넌트 상태
    pub components: ComponentHealth,
}

/// 개별 컴포넌트 상태.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealth {
    /// 지표 저장소
    pub database: ComponentStatus,

    /// 스냅샷 캐시
    pub cache: ComponentStatus,

    /// 중앙은행 시계열 API
    pub upstream: ComponentStatus,
}

/// 컴포넌트 상태.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentStatus {
    /// 상태 ("healthy" | "unhealthy")
    pub status: String,

    /// 점검 소요 시간(ms)
    pub response_time_ms: u64,

    /// 점검 결과 설명
    pub message: String,
}

impl ComponentStatus {
    pub fn healthy(started: Instant, message: impl Into<String>) -> Self {
        Self {
            status: "healthy".to_string(),
            response_time_ms: started.elapsed().as_millis() as u64,
            message: message.into(),
        }
    }

    pub fn unhealthy(started: Instant, message: impl Into<String>) -> Self {
        Self {
            status: "unhealthy".to_string(),
            response_time_ms: started.elapsed().as_millis() as u64,
            message: message.into(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// 간단한 헬스 체크 (liveness probe용).
///
/// GET /health
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "서버 응답 가능")),
    tag = "health"
)]
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// 상세 헬스 체크 (readiness probe용).
///
/// 세 점검을 동시에 실행하고 하나라도 실패하면 503을 반환합니다.
/// GET /health/ready
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "모든 의존성 정상", body = HealthResponse),
        (status = 503, description = "하나 이상의 의존성 이상", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (database, cache, upstream) = tokio::join!(
        check_database(&state),
        check_cache(&state),
        check_upstream(&state)
    );

    let all_healthy = database.is_healthy() && cache.is_healthy() && upstream.is_healthy();
    let (overall_status, status_code) = if all_healthy {
        ("healthy", StatusCode::OK)
    } else {
        ("unhealthy", StatusCode::SERVICE_UNAVAILABLE)
    };

    let response = HealthResponse {
        status: overall_status.to_string(),
        version: state.version.clone(),
        uptime_secs: state.uptime_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        components: ComponentHealth {
            database,
            cache,
            upstream,
        },
    };

    (status_code, Json(response))
}

async fn check_database(state: &AppState) -> ComponentStatus {
    let started = Instant::now();

    if let Err(e) = state.store.ping().await {
        return ComponentStatus::unhealthy(started, format!("연결 실패: {}", e));
    }

    match state.store.count().await {
        Ok(count) => ComponentStatus::healthy(started, format!("{} indicators stored", count)),
        Err(e) => ComponentStatus::unhealthy(started, format!("조회 실패: {}", e)),
    }
}

/// 점검 키를 기록하고 다시 읽어 비교한 뒤 지웁니다. SELIC 캐시 항목 존재 여부도 보고합니다.
async fn check_cache(state: &AppState) -> ComponentStatus {
    let started = Instant::now();
    let cache = state.cache.raw();
    let probe = chrono::Utc::now().to_rfc3339();

    if let Err(e) = cache.set(CACHE_PROBE_KEY, &probe, CACHE_PROBE_TTL).await {
        return ComponentStatus::unhealthy(started, format!("쓰기 실패: {}", e));
    }

    match cache.get(CACHE_PROBE_KEY).await {
        Ok(Some(value)) if value == probe => {}
        Ok(_) => return ComponentStatus::unhealthy(started, "읽은 값이 기록한 값과 다름"),
        Err(e) => return ComponentStatus::unhealthy(started, format!("읽기 실패: {}", e)),
    }

    if let Err(e) = cache.delete(CACHE_PROBE_KEY).await {
        return ComponentStatus::unhealthy(started, format!("삭제 실패: {}", e));
    }

    let selic_cached = match find_indicator(IndicatorType::Selic, Window::Current) {
        Some(def) => cache.exists(&def.cache_key()).await.unwrap_or(false),
        None => false,
    };

    ComponentStatus::healthy(started, format!("read/write ok, SELIC cached: {}", selic_cached))
}

async fn check_upstream(state: &AppState) -> ComponentStatus {
    let started = Instant::now();

    let Some(def) = find_indicator(IndicatorType::Selic, Window::Current) else {
        return ComponentStatus::unhealthy(started, "SELIC 카탈로그 항목 없음");
    };

    match state.source.probe(&def.source_path()).await {
        Ok(()) => ComponentStatus::healthy(started, "SGS reachable"),
        Err(e) => ComponentStatus::unhealthy(started, e.to_string()),
    }
}

/// 헬스 체크 라우터 생성.
pub fn health_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(health_ready))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_test_state;
    use axum::{body::Body, http::Request};
    use breconomy_data::testing::{series, StubSource};
    use breconomy_data::{IndicatorCache, KeyValueCache, MemoryCache, MemoryIndicatorStore};
    use tower::ServiceExt;

    fn selic_path() -> String {
        find_indicator(IndicatorType::Selic, Window::Current)
            .unwrap()
            .source_path()
    }

    async fn ready(state: AppState) -> (StatusCode, serde_json::Value) {
        let app = Router::new()
            .nest("/health", health_router())
            .with_state(Arc::new(state));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/ready")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health_check_returns_ok() {
        let app = Router::new().route("/health", get(health_check));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ready_when_all_dependencies_respond() {
        let mut state = create_test_state();
        state.source =
            Arc::new(StubSource::new().with_reply(selic_path(), series("27/01/2026", "11.25")));

        let (status, body) = ready(state).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["components"]["database"]["message"], "0 indicators stored");
        assert_eq!(
            body["components"]["cache"]["message"],
            "read/write ok, SELIC cached: false"
        );
        assert_eq!(body["components"]["upstream"]["status"], "healthy");
    }

    #[tokio::test]
    async fn test_ready_removes_cache_probe_key() {
        let cache = Arc::new(MemoryCache::new());
        let state = AppState::new(
            Arc::new(MemoryIndicatorStore::new()),
            IndicatorCache::new(cache.clone()),
            Arc::new(StubSource::new().with_reply(selic_path(), series("27/01/2026", "11.25"))),
        );

        let (status, body) = ready(state).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["components"]["cache"]["status"], "healthy");
        assert!(!cache.exists(CACHE_PROBE_KEY).await.unwrap());
        assert_eq!(cache.get(CACHE_PROBE_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_unavailable() {
        // 응답이 없는 StubSource는 404
        let (status, body) = ready(create_test_state()).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unhealthy");
        assert_eq!(body["components"]["database"]["status"], "healthy");
        assert_eq!(body["components"]["cache"]["status"], "healthy");
        assert_eq!(body["components"]["upstream"]["status"], "unhealthy");
    }

    #[tokio::test]
    async fn test_store_and_cache_outage() {
        let store = Arc::new(MemoryIndicatorStore::new());
        store.set_available(false);
        let cache = Arc::new(MemoryCache::new());
        cache.set_available(false);

        let state = AppState::new(
            store,
            IndicatorCache::new(cache),
            Arc::new(StubSource::new().with_reply(selic_path(), series("27/01/2026", "11.25"))),
        );

        let (status, body) = ready(state).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["components"]["database"]["status"], "unhealthy");
        assert_eq!(body["components"]["cache"]["status"], "unhealthy");
        assert_eq!(body["components"]["upstream"]["status"], "healthy");
    }
}
