//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! 저장소, 캐시, 업스트림 클라이언트는 시작 시 한 번 만들어지며 갱신 작업과
//! 같은 인스턴스를 공유합니다.

use std::sync::Arc;
use std::time::Duration;

use breconomy_collector::RefreshDeps;
use breconomy_data::{IndicatorCache, IndicatorStore, SeriesSource};

/// 캐시 자가 복구 기록의 기본 만료 시간.
pub const DEFAULT_FALLBACK_TTL: Duration = Duration::from_secs(3600);

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 지표 저장소 (PostgreSQL 또는 인메모리)
    pub store: Arc<dyn IndicatorStore>,

    /// 지표 스냅샷 캐시 (Redis 또는 인메모리)
    pub cache: IndicatorCache,

    /// 중앙은행 시계열 클라이언트 (readiness 점검용)
    pub source: Arc<dyn SeriesSource>,

    /// 저장소 폴백 후 캐시에 다시 기록할 때의 만료 시간
    pub fallback_ttl: Duration,

    /// 서버 시작 시간
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    pub fn new(
        store: Arc<dyn IndicatorStore>,
        cache: IndicatorCache,
        source: Arc<dyn SeriesSource>,
    ) -> Self {
        Self {
            store,
            cache,
            source,
            fallback_ttl: DEFAULT_FALLBACK_TTL,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 갱신 작업과 같은 협력자로 상태를 만듭니다.
    pub fn from_deps(deps: &RefreshDeps) -> Self {
        Self::new(deps.store.clone(), deps.cache.clone(), deps.source.clone())
    }

    /// 캐시 자가 복구 만료 시간 설정.
    pub fn with_fallback_ttl(mut self, ttl: Duration) -> Self {
        self.fallback_ttl = ttl;
        self
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }
}

/// 인메모리 협력자로 구성한 테스트용 상태.
///
/// 업스트림은 응답이 지정되지 않은 `StubSource`입니다 (모든 경로 404).
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    use breconomy_data::testing::StubSource;
    use breconomy_data::{MemoryCache, MemoryIndicatorStore};

    AppState::new(
        Arc::new(MemoryIndicatorStore::new()),
        IndicatorCache::new(Arc::new(MemoryCache::new())),
        Arc::new(StubSource::new()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_defaults() {
        let state = create_test_state();
        assert_eq!(state.fallback_ttl, DEFAULT_FALLBACK_TTL);
        assert_eq!(state.version, env!("CARGO_PKG_VERSION"));
        assert!(state.uptime_secs() >= 0);
    }

    #[test]
    fn test_with_fallback_ttl() {
        let state = create_test_state().with_fallback_ttl(Duration::from_secs(60));
        assert_eq!(state.fallback_ttl, Duration::from_secs(60));
    }
}
