//! 갱신 주기에서 조회 응답까지의 통합 테스트.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use breconomy_api::routes::DATA_SOURCE_HEADER;
use breconomy_api::{create_api_router, AppState};
use breconomy_collector::{run_cycle, CycleOutcome, RefreshDeps, RefreshJobConfig};
use breconomy_core::RefreshConfig;
use breconomy_data::testing::{series, StubReply, StubSource};
use breconomy_data::{
    IndicatorCache, IndicatorStore, KeyValueCache, MemoryCache, MemoryIndicatorStore,
};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

struct Harness {
    job: RefreshJobConfig,
    deps: RefreshDeps,
    source: Arc<StubSource>,
    raw_cache: Arc<MemoryCache>,
    app: Router,
}

fn harness(indicator: &str) -> Harness {
    let job = RefreshJobConfig::select(&RefreshConfig::default(), Some(indicator))
        .unwrap()
        .remove(0);

    let source = Arc::new(StubSource::new());
    let raw_cache = Arc::new(MemoryCache::new());
    let deps = RefreshDeps {
        store: Arc::new(MemoryIndicatorStore::new()),
        cache: IndicatorCache::new(raw_cache.clone()),
        source: source.clone(),
    };
    let app = create_api_router().with_state(Arc::new(AppState::from_deps(&deps)));

    Harness {
        job,
        deps,
        source,
        raw_cache,
        app,
    }
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Option<String>, String) {
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
    (status, source, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn refreshed_selic_is_served_from_cache_then_store() {
    let h = harness("SELIC");
    h.source
        .set_reply(&h.job.source_path, series("27/01/2026", "11.25"));

    let outcome = run_cycle(&h.job, &h.deps, &CancellationToken::new()).await;
    assert!(matches!(outcome, CycleOutcome::Updated { cached: true, .. }));

    let (status, source, body) = get(&h.app, "/api/v1/indicators/selic").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(source.as_deref(), Some("cache"));
    assert_eq!(body, r#"{"value":11.25,"date":"2026-01-27"}"#);

    // 캐시 만료 후에는 저장소에서 같은 값
    h.raw_cache.delete(&h.job.cache_key).await.unwrap();
    let (status, source, body) = get(&h.app, "/api/v1/indicators/selic").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(source.as_deref(), Some("database"));
    assert_eq!(body, r#"{"value":11.25,"date":"2026-01-27"}"#);
}

#[tokio::test]
async fn failed_refresh_keeps_last_good_value() {
    let h = harness("IPCA_12M");
    h.source
        .set_reply(&h.job.source_path, series("01/12/2025", "4.46"));
    run_cycle(&h.job, &h.deps, &CancellationToken::new()).await;

    h.source.set_reply(&h.job.source_path, StubReply::Status(503));
    let outcome = run_cycle(&h.job, &h.deps, &CancellationToken::new()).await;
    assert!(matches!(outcome, CycleOutcome::Failed(_)));

    h.source
        .set_reply(&h.job.source_path, series("01/01/2026", "abc"));
    let outcome = run_cycle(&h.job, &h.deps, &CancellationToken::new()).await;
    assert!(matches!(outcome, CycleOutcome::Skipped(_)));

    let (status, _, body) = get(&h.app, "/api/v1/indicators/ipca/12m").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"value":4.46,"date":"2025-12-01"}"#);
    assert_eq!(h.deps.store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn indicator_without_successful_refresh_is_not_found() {
    let h = harness("DOLAR");
    h.source.set_reply(&h.job.source_path, StubReply::Records(vec![]));

    let outcome = run_cycle(&h.job, &h.deps, &CancellationToken::new()).await;
    assert!(matches!(outcome, CycleOutcome::Skipped(_)));

    let (status, source, body) = get(&h.app, "/api/v1/indicators/dolar").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(source.is_none());
    assert!(body.contains("No data loaded yet for indicator DOLAR"));
}
