//! 인메모리 저장소와 캐시.
//!
//! `DATABASE_URL`/`REDIS_URL`이 없을 때의 대체 구현이자 테스트용 협력자입니다.
//! `set_available(false)`로 장애 상황을 흉내낼 수 있습니다.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use breconomy_core::{IndicatorRecord, IndicatorUpdate};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::time::Instant;
use uuid::Uuid;

use super::{IndicatorStore, KeyValueCache};
use crate::error::{DataError, Result};

/// 인메모리 지표 저장소.
#[derive(Debug)]
pub struct MemoryIndicatorStore {
    records: RwLock<HashMap<String, IndicatorRecord>>,
    available: AtomicBool,
    reads: AtomicU64,
    writes: AtomicU64,
}

impl Default for MemoryIndicatorStore {
    fn default() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
        }
    }
}

impl MemoryIndicatorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// `find_by_name` 호출 횟수.
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    /// 성공한 `upsert` 횟수.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DataError::ConnectionError("store unavailable".to_string()))
        }
    }
}

#[async_trait]
impl IndicatorStore for MemoryIndicatorStore {
    async fn upsert(
        &self,
        update: &IndicatorUpdate,
        updated_at: DateTime<Utc>,
    ) -> Result<IndicatorRecord> {
        self.check_available()?;

        let mut records = self.records.write().await;
        let record = records
            .entry(update.name.clone())
            .and_modify(|r| {
                r.value = update.value;
                r.reference_date = update.reference_date;
                r.last_updated = updated_at;
            })
            .or_insert_with(|| IndicatorRecord {
                id: Uuid::new_v4(),
                name: update.name.clone(),
                value: update.value,
                reference_date: update.reference_date,
                last_updated: updated_at,
            })
            .clone();

        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(record)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<IndicatorRecord>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.records.read().await.get(name).cloned())
    }

    async fn count(&self) -> Result<i64> {
        self.check_available()?;
        Ok(self.records.read().await.len() as i64)
    }

    async fn ping(&self) -> Result<()> {
        self.check_available()
    }
}

/// 인메모리 만료 캐시.
///
/// 만료는 `tokio::time::Instant` 기준이므로 일시정지된 테스트 시계를 따릅니다.
#[derive(Debug)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, (String, Instant)>>,
    available: AtomicBool,
    writes: AtomicU64,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
            writes: AtomicU64::new(0),
        }
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// 성공한 `set` 횟수.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// 키의 남은 TTL. 없거나 만료되었으면 `None`.
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .and_then(|(_, expires_at)| expires_at.checked_duration_since(Instant::now()))
            .filter(|d| !d.is_zero())
    }

    /// 만료된 항목만 제거합니다. 읽기 잠금을 놓은 사이 새로 기록된 값은 남깁니다.
    async fn evict_expired(&self, key: &str) {
        let mut entries = self.entries.write().await;
        if let Entry::Occupied(entry) = entries.entry(key.to_string()) {
            if entry.get().1 <= Instant::now() {
                entry.remove();
            }
        }
    }

    fn check_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DataError::CacheError("cache unavailable".to_string()))
        }
    }
}

#[async_trait]
impl KeyValueCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check_available()?;

        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some((value, expires_at)) if *expires_at > now => return Ok(Some(value.clone())),
                None => return Ok(None),
                Some(_) => {}
            }
        }

        self.evict_expired(key).await;
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.check_available()?;

        let expires_at = Instant::now() + ttl;
        self.entries
            .write()
            .await
            .insert(key.to_string(), (value.to_string(), expires_at));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.check_available()?;
        Ok(self.entries.write().await.remove(key).is_some())
    }
}
