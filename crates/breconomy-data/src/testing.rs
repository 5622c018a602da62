//! 테스트용 업스트림 스텁.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use breconomy_core::SeriesRecord;

use crate::error::{DataError, Result};
use crate::provider::SeriesSource;

/// 경로별로 미리 정한 응답.
#[derive(Debug, Clone)]
pub enum StubReply {
    Records(Vec<SeriesRecord>),
    Status(u16),
    Malformed,
    Timeout,
}

/// `[{"data": date, "valor": value}]` 한 건.
pub fn series(date: &str, value: &str) -> StubReply {
    StubReply::Records(vec![SeriesRecord {
        date: date.to_string(),
        value: value.to_string(),
    }])
}

/// 경로별 응답과 지연을 설정할 수 있는 `SeriesSource`.
///
/// 응답이 지정되지 않은 경로는 404입니다.
#[derive(Debug, Default)]
pub struct StubSource {
    replies: Mutex<HashMap<String, StubReply>>,
    delays: Mutex<HashMap<String, Duration>>,
    calls: Mutex<HashMap<String, u64>>,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(self, path: impl Into<String>, reply: StubReply) -> Self {
        self.set_reply(path, reply);
        self
    }

    pub fn with_delay(self, path: impl Into<String>, delay: Duration) -> Self {
        lock(&self.delays).insert(path.into(), delay);
        self
    }

    pub fn set_reply(&self, path: impl Into<String>, reply: StubReply) {
        lock(&self.replies).insert(path.into(), reply);
    }

    /// 경로에 대한 호출 횟수.
    pub fn calls(&self, path: &str) -> u64 {
        lock(&self.calls).get(path).copied().unwrap_or(0)
    }

    async fn respond(&self, path: &str) -> Result<Vec<SeriesRecord>> {
        *lock(&self.calls).entry(path.to_string()).or_default() += 1;

        let delay = lock(&self.delays).get(path).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let reply = lock(&self.replies).get(path).cloned();
        match reply {
            Some(StubReply::Records(records)) => Ok(records),
            Some(StubReply::Status(status)) => Err(DataError::UpstreamStatus {
                status,
                path: path.to_string(),
            }),
            Some(StubReply::Malformed) => Err(DataError::ParseError(format!(
                "{}: expected value at line 1 column 1",
                path
            ))),
            Some(StubReply::Timeout) => Err(DataError::Timeout(path.to_string())),
            None => Err(DataError::UpstreamStatus {
                status: 404,
                path: path.to_string(),
            }),
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl SeriesSource for StubSource {
    async fn fetch_series(&self, path: &str) -> Result<Vec<SeriesRecord>> {
        self.respond(path).await
    }

    async fn probe(&self, path: &str) -> Result<()> {
        self.respond(path).await.map(|_| ())
    }
}
