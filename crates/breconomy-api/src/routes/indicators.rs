//! 지표 조회 endpoint.
//!
//! 캐시를 먼저 보고, 없으면 저장소로 대체합니다. 저장소에서 읽은 값은 다음 조회가
//! 캐시에서 끝나도록 짧은 만료 시간으로 다시 기록합니다. 쓰기 경로는 노출하지 않으며
//! 모든 쓰기는 갱신 작업에서만 일어납니다.
//!
//! # 엔드포인트
//!
//! - `GET /api/v1/indicators` - 카탈로그 목록
//! - `GET /api/v1/indicators/{indicator_type}` - 기본 기간의 최신 값
//! - `GET /api/v1/indicators/{indicator_type}/{window}` - 기간 지정 최신 값

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use breconomy_core::{
    resolve_indicator, IndicatorDefinition, IndicatorSnapshot, IndicatorType, Window, CATALOG,
};
use chrono::{NaiveDate, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};
use utoipa::ToSchema;

use crate::error::{internal_error, not_loaded, unknown_indicator, ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// 값의 출처를 알려주는 응답 헤더.
pub const DATA_SOURCE_HEADER: &str = "x-data-source";

// ==================== 응답 타입 ====================

/// 지표 최신 값.
///
/// ```json
/// {"value": 11.25, "date": "2026-01-27"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct IndicatorReading {
    /// 지표 값
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 11.25)]
    pub value: Decimal,
    /// 기준일
    #[schema(value_type = String, example = "2026-01-27")]
    pub date: NaiveDate,
}

/// 응답 값의 출처.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Cache,
    Database,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Database => "database",
        }
    }
}

/// 카탈로그 항목.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IndicatorListItem {
    pub indicator_type: IndicatorType,
    pub window: Window,
    /// 저장소 이름 (예: "IPCA_12M")
    pub name: String,
    /// 중앙은행 SGS 시계열 코드
    pub series_code: u32,
    pub description: String,
    /// 조회 경로
    pub path: String,
}

impl From<&IndicatorDefinition> for IndicatorListItem {
    fn from(def: &IndicatorDefinition) -> Self {
        Self {
            indicator_type: def.indicator_type,
            window: def.window,
            name: def.name.to_string(),
            series_code: def.series_code,
            description: def.description.to_string(),
            path: format!("/api/v1/indicators/{}/{}", def.indicator_type, def.window),
        }
    }
}

/// 카탈로그 목록 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IndicatorListResponse {
    pub indicators: Vec<IndicatorListItem>,
    pub total: usize,
}

// ==================== 핸들러 ====================

/// 카탈로그 목록 조회.
#[utoipa::path(
    get,
    path = "/api/v1/indicators",
    responses(
        (status = 200, description = "지표 목록", body = IndicatorListResponse)
    ),
    tag = "indicators"
)]
pub async fn list_indicators() -> Json<IndicatorListResponse> {
    let indicators: Vec<IndicatorListItem> = CATALOG.iter().map(Into::into).collect();
    Json(IndicatorListResponse {
        total: indicators.len(),
        indicators,
    })
}

/// 기본 기간의 최신 값 조회.
#[utoipa::path(
    get,
    path = "/api/v1/indicators/{indicator_type}",
    params(
        ("indicator_type" = String, Path, description = "지표 유형 (selic, cdi, ipca, dolar)")
    ),
    responses(
        (status = 200, description = "최신 값", body = IndicatorReading),
        (status = 400, description = "알 수 없는 지표", body = ApiErrorResponse),
        (status = 404, description = "아직 적재된 값 없음", body = ApiErrorResponse),
        (status = 500, description = "서버 오류", body = ApiErrorResponse)
    ),
    tag = "indicators"
)]
pub async fn get_indicator(
    State(state): State<Arc<AppState>>,
    Path(indicator_type): Path<String>,
) -> ApiResult<Response> {
    let def = resolve_indicator(&indicator_type, None)
        .map_err(|_| unknown_indicator(&indicator_type))?;
    serve_indicator(&state, def).await
}

/// 기간 지정 최신 값 조회.
///
/// `window`는 `current`, `ytd`, `12m` 또는 기본 기간을 뜻하는 `latest`.
#[utoipa::path(
    get,
    path = "/api/v1/indicators/{indicator_type}/{window}",
    params(
        ("indicator_type" = String, Path, description = "지표 유형 (selic, cdi, ipca, dolar)"),
        ("window" = String, Path, description = "기간 (current, ytd, 12m, latest)")
    ),
    responses(
        (status = 200, description = "최신 값", body = IndicatorReading),
        (status = 400, description = "알 수 없는 지표", body = ApiErrorResponse),
        (status = 404, description = "아직 적재된 값 없음", body = ApiErrorResponse),
        (status = 500, description = "서버 오류", body = ApiErrorResponse)
    ),
    tag = "indicators"
)]
pub async fn get_indicator_window(
    State(state): State<Arc<AppState>>,
    Path((indicator_type, window)): Path<(String, String)>,
) -> ApiResult<Response> {
    let def = resolve_indicator(&indicator_type, Some(&window))
        .map_err(|_| unknown_indicator(&format!("{}/{}", indicator_type, window)))?;
    serve_indicator(&state, def).await
}

async fn serve_indicator(state: &AppState, def: &IndicatorDefinition) -> ApiResult<Response> {
    let (source, reading) = read_indicator(state, def).await?;
    Ok(([(DATA_SOURCE_HEADER, source.as_str())], Json(reading)).into_response())
}

/// 캐시 우선 조회, 미스 시 저장소 대체.
///
/// 캐시 적중 경로는 저장소를 건드리지 않습니다. 캐시 조회 실패나 해석할 수 없는
/// 항목은 미스로 취급합니다. 저장소 대체 후의 캐시 기록 실패는 응답에 영향을 주지
/// 않습니다.
pub async fn read_indicator(
    state: &AppState,
    def: &IndicatorDefinition,
) -> ApiResult<(DataSource, IndicatorReading)> {
    let cache_key = def.cache_key();

    match state.cache.get_snapshot(&cache_key).await {
        Ok(Some(snapshot)) => match snapshot.reference_day() {
            Ok(date) => {
                counter!("indicator_cache_lookups_total", "result" => "hit").increment(1);
                debug!(indicator = def.name, cache_key = %cache_key, "캐시 적중");
                return Ok((
                    DataSource::Cache,
                    IndicatorReading {
                        value: snapshot.value,
                        date,
                    },
                ));
            }
            Err(e) => {
                counter!("indicator_cache_lookups_total", "result" => "error").increment(1);
                warn!(indicator = def.name, cache_key = %cache_key, error = %e, "캐시 항목 기준일 해석 실패");
            }
        },
        Ok(None) => {
            counter!("indicator_cache_lookups_total", "result" => "miss").increment(1);
        }
        Err(e) => {
            counter!("indicator_cache_lookups_total", "result" => "error").increment(1);
            warn!(indicator = def.name, cache_key = %cache_key, error = %e, "캐시 조회 실패, 저장소로 대체");
        }
    }

    let record = match state.store.find_by_name(def.name).await {
        Ok(Some(record)) => record,
        Ok(None) => return Err(not_loaded(def.name)),
        Err(e) => {
            error!(indicator = def.name, error = %e, "저장소 조회 실패");
            return Err(internal_error());
        }
    };

    let snapshot = IndicatorSnapshot::from_record(&record, Utc::now());
    if let Err(e) = state
        .cache
        .put_snapshot(&cache_key, &snapshot, state.fallback_ttl)
        .await
    {
        warn!(indicator = def.name, cache_key = %cache_key, error = %e, "캐시 복구 기록 실패");
    }

    Ok((
        DataSource::Database,
        IndicatorReading {
            value: record.value,
            date: record.reference_day(),
        },
    ))
}

/// 지표 라우터 생성.
pub fn indicators_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_indicators))
        .route("/{indicator_type}", get(get_indicator))
        .route("/{indicator_type}/{window}", get(get_indicator_window))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use breconomy_core::IndicatorUpdate;
    use breconomy_data::testing::StubSource;
    use breconomy_data::{
        IndicatorCache, IndicatorStore, KeyValueCache, MemoryCache, MemoryIndicatorStore,
    };
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use std::time::Duration;
    use tower::ServiceExt;

    struct Fixture {
        store: Arc<MemoryIndicatorStore>,
        raw_cache: Arc<MemoryCache>,
        app: Router,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryIndicatorStore::new());
        let raw_cache = Arc::new(MemoryCache::new());
        let state = AppState::new(
            store.clone(),
            IndicatorCache::new(raw_cache.clone()),
            Arc::new(StubSource::new()),
        );
        let app = Router::new()
            .nest("/api/v1/indicators", indicators_router())
            .with_state(Arc::new(state));

        Fixture {
            store,
            raw_cache,
            app,
        }
    }

    async fn seed_store(store: &MemoryIndicatorStore, name: &str, value: Decimal) {
        let update = IndicatorUpdate {
            name: name.to_string(),
            value,
            reference_date: Utc.with_ymd_and_hms(2026, 1, 27, 0, 0, 0).unwrap(),
        };
        store.upsert(&update, Utc::now()).await.unwrap();
    }

    async fn fetch(app: &Router, uri: &str) -> (StatusCode, Option<String>, serde_json::Value) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let source = response
            .headers()
            .get(DATA_SOURCE_HEADER)
            .map(|v| v.to_str().unwrap().to_string());
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, source, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_cache_hit_does_not_touch_store() {
        let f = fixture();
        f.raw_cache
            .set(
                "indicador:selic",
                r#"{"value":11.25,"date":"27/01/2026","lastVerifiedAt":"2026-01-27T12:00:00Z"}"#,
                Duration::from_secs(60),
            )
            .await
            .unwrap();

        let (status, source, body) = fetch(&f.app, "/api/v1/indicators/selic").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(source.as_deref(), Some("cache"));
        assert_eq!(body, serde_json::json!({"value": 11.25, "date": "2026-01-27"}));
        assert_eq!(f.store.reads(), 0);
    }

    #[tokio::test]
    async fn test_cache_miss_falls_back_and_repopulates() {
        let f = fixture();
        seed_store(&f.store, "IPCA_12M", dec!(4.56)).await;

        let (status, source, body) = fetch(&f.app, "/api/v1/indicators/ipca/12m").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(source.as_deref(), Some("database"));
        assert_eq!(body, serde_json::json!({"value": 4.56, "date": "2026-01-27"}));

        let ttl = f.raw_cache.ttl("indicador:ipca:12m").await.unwrap();
        assert!(ttl <= Duration::from_secs(3600));

        // 두 번째 조회는 캐시에서
        let (_, source, _) = fetch(&f.app, "/api/v1/indicators/ipca/12m").await;
        assert_eq!(source.as_deref(), Some("cache"));
        assert_eq!(f.store.reads(), 1);
    }

    #[tokio::test]
    async fn test_never_loaded_indicator_is_not_found() {
        let f = fixture();

        let (status, source, body) = fetch(&f.app, "/api/v1/indicators/selic").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(source.is_none());
        assert_eq!(body["code"], "INDICATOR_NOT_LOADED");
        assert_eq!(body["message"], "No data loaded yet for indicator SELIC");
    }

    #[tokio::test]
    async fn test_store_failure_is_generic_internal_error() {
        let f = fixture();
        f.store.set_available(false);

        let (status, _, body) = fetch(&f.app, "/api/v1/indicators/dolar").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            serde_json::json!({"code": "INTERNAL_ERROR", "message": "Internal server error"})
        );
    }

    #[tokio::test]
    async fn test_cache_outage_still_serves_from_store() {
        let f = fixture();
        seed_store(&f.store, "DOLAR", dec!(5.4321)).await;
        f.raw_cache.set_available(false);

        let (status, source, body) = fetch(&f.app, "/api/v1/indicators/dolar").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(source.as_deref(), Some("database"));
        assert_eq!(body["value"], 5.4321);
    }

    #[tokio::test]
    async fn test_corrupt_cache_entry_is_repaired() {
        let f = fixture();
        seed_store(&f.store, "SELIC", dec!(11.25)).await;
        f.raw_cache
            .set("indicador:selic", "{not json", Duration::from_secs(60))
            .await
            .unwrap();

        let (status, source, _) = fetch(&f.app, "/api/v1/indicators/selic").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(source.as_deref(), Some("database"));

        let (_, source, _) = fetch(&f.app, "/api/v1/indicators/selic").await;
        assert_eq!(source.as_deref(), Some("cache"));
    }

    #[tokio::test]
    async fn test_default_and_latest_windows() {
        let f = fixture();
        seed_store(&f.store, "CDI_12M", dec!(12.1)).await;
        seed_store(&f.store, "CDI_YTD", dec!(0.9)).await;

        let (_, _, body) = fetch(&f.app, "/api/v1/indicators/cdi").await;
        assert_eq!(body["value"], 12.1);

        let (_, _, body) = fetch(&f.app, "/api/v1/indicators/CDI/latest").await;
        assert_eq!(body["value"], 12.1);

        let (_, _, body) = fetch(&f.app, "/api/v1/indicators/cdi/ytd").await;
        assert_eq!(body["value"], 0.9);
    }

    #[tokio::test]
    async fn test_unknown_indicator_is_bad_request() {
        let f = fixture();

        let (status, _, body) = fetch(&f.app, "/api/v1/indicators/bitcoin").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "UNKNOWN_INDICATOR");

        // 존재하지 않는 조합
        let (status, _, _) = fetch(&f.app, "/api/v1/indicators/selic/ytd").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_indicators() {
        let f = fixture();

        let (status, _, body) = fetch(&f.app, "/api/v1/indicators").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], CATALOG.len());
        assert_eq!(body["indicators"][0]["name"], "SELIC");
        assert_eq!(body["indicators"][0]["path"], "/api/v1/indicators/selic/current");
        assert_eq!(body["indicators"][2]["window"], "12m");
    }
}
