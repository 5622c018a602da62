//! 저장소와 캐시 협력자.
//!
//! 갱신 작업과 조회 핸들러는 구체 타입이 아니라 아래 trait 객체(`Arc<dyn ...>`)를
//! 주입받습니다. 시작 시 한 번 생성되어 모든 작업과 핸들러가 공유합니다.

pub mod memory;
pub mod postgres;
pub mod redis;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use breconomy_core::{
    DatabaseConfig, IndicatorRecord, IndicatorSnapshot, IndicatorUpdate, RedisConfig,
};
use chrono::{DateTime, Utc};
use tracing::warn;

use crate::error::Result;

pub use memory::{MemoryCache, MemoryIndicatorStore};
pub use postgres::{Database, PgIndicatorStore};
pub use self::redis::RedisCache;

/// 이름 기준 지표 저장소.
#[async_trait]
pub trait IndicatorStore: Send + Sync {
    /// 이름이 없으면 생성하고, 있으면 값/기준일/갱신 시각을 덮어씁니다.
    async fn upsert(
        &self,
        update: &IndicatorUpdate,
        updated_at: DateTime<Utc>,
    ) -> Result<IndicatorRecord>;

    /// 이름으로 레코드를 조회합니다.
    async fn find_by_name(&self, name: &str) -> Result<Option<IndicatorRecord>>;

    /// 저장된 레코드 수.
    async fn count(&self) -> Result<i64>;

    /// 연결 가능 여부 확인.
    async fn ping(&self) -> Result<()>;
}

/// 만료 시간을 갖는 키-값 캐시.
///
/// 구현체는 여러 호출자의 동시 사용에 안전해야 합니다. 같은 키에 대한 경쟁은
/// 마지막 쓰기가 이깁니다.
#[async_trait]
pub trait KeyValueCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<bool>;

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
}

/// 지표 스냅샷 단위의 캐시 접근.
#[derive(Clone)]
pub struct IndicatorCache {
    inner: Arc<dyn KeyValueCache>,
}

impl IndicatorCache {
    pub fn new(inner: Arc<dyn KeyValueCache>) -> Self {
        Self { inner }
    }

    /// 원시 키-값 캐시 핸들.
    pub fn raw(&self) -> &Arc<dyn KeyValueCache> {
        &self.inner
    }

    /// 스냅샷을 조회합니다.
    ///
    /// 빈 문자열은 미스로 취급합니다. 역직렬화 실패는 `SerializationError`입니다.
    pub async fn get_snapshot(&self, key: &str) -> Result<Option<IndicatorSnapshot>> {
        match self.inner.get(key).await? {
            Some(json) if !json.trim().is_empty() => Ok(Some(serde_json::from_str(&json)?)),
            _ => Ok(None),
        }
    }

    /// 스냅샷을 주어진 TTL로 기록합니다.
    pub async fn put_snapshot(
        &self,
        key: &str,
        snapshot: &IndicatorSnapshot,
        ttl: Duration,
    ) -> Result<()> {
        let json = serde_json::to_string(snapshot)?;
        self.inner.set(key, &json, ttl).await
    }
}

/// 설정에 따라 저장소를 연결합니다.
///
/// URL이 있으면 PostgreSQL에 연결하고 마이그레이션을 실행합니다. 없으면 인메모리 저장소를
/// 사용합니다 (재시작 시 데이터 소실).
pub async fn connect_store(config: &DatabaseConfig) -> Result<Arc<dyn IndicatorStore>> {
    match config.url.as_deref() {
        Some(url) => {
            let db = Database::connect(url, config).await?;
            db.migrate().await?;
            Ok(Arc::new(PgIndicatorStore::new(db)))
        }
        None => {
            warn!("DATABASE_URL이 설정되지 않음, 인메모리 저장소 사용");
            Ok(Arc::new(MemoryIndicatorStore::new()))
        }
    }
}

/// 설정에 따라 캐시를 연결합니다.
///
/// Redis에 연결할 수 없으면 인메모리 캐시로 대체합니다. 캐시는 저장소의 보조 계층이므로
/// 연결 실패가 시작을 막지 않습니다.
pub async fn connect_cache(config: &RedisConfig) -> Arc<dyn KeyValueCache> {
    let Some(url) = config.url.as_deref() else {
        warn!("REDIS_URL이 설정되지 않음, 인메모리 캐시 사용");
        return Arc::new(MemoryCache::new());
    };

    match RedisCache::connect(url).await {
        Ok(cache) => Arc::new(cache),
        Err(e) => {
            warn!(error = %e, "Redis 연결 실패, 인메모리 캐시 사용");
            Arc::new(MemoryCache::new())
        }
    }
}
