//! 지표별 갱신 작업 스케줄러.
//!
//! 지표마다 독립된 tokio 태스크를 하나씩 띄웁니다. 한 지표의 느린 조회가 다른 지표의
//! 일정을 지연시키지 않고, 같은 지표의 주기는 단일 루프 안에서 순차 실행됩니다.

use futures::future::join_all;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::refresh::{run_refresh_job, RefreshDeps};
use crate::config::RefreshJobConfig;
use crate::stats::RefreshStats;

/// 실행 중인 갱신 작업 핸들 모음.
pub struct RefreshScheduler {
    handles: Vec<(String, JoinHandle<RefreshStats>)>,
    shutdown: CancellationToken,
}

/// 작업 설정마다 갱신 작업을 띄웁니다.
pub fn spawn_refresh_jobs(
    jobs: Vec<RefreshJobConfig>,
    deps: RefreshDeps,
    shutdown: CancellationToken,
) -> RefreshScheduler {
    info!(count = jobs.len(), "지표 갱신 작업 스케줄링");

    let handles = jobs
        .into_iter()
        .map(|job| {
            let name = job.name.clone();
            let handle = tokio::spawn(run_refresh_job(job, deps.clone(), shutdown.clone()));
            (name, handle)
        })
        .collect();

    RefreshScheduler { handles, shutdown }
}

impl RefreshScheduler {
    /// 실행 중인 작업 이름.
    pub fn names(&self) -> Vec<&str> {
        self.handles.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// 모든 작업에 종료를 알리고 끝날 때까지 기다립니다.
    pub async fn shutdown(self) -> Vec<RefreshStats> {
        self.shutdown.cancel();
        self.join().await
    }

    /// 모든 작업이 끝날 때까지 기다립니다.
    pub async fn join(self) -> Vec<RefreshStats> {
        let (names, handles): (Vec<_>, Vec<_>) = self.handles.into_iter().unzip();

        join_all(handles)
            .await
            .into_iter()
            .zip(names)
            .filter_map(|(result, name)| match result {
                Ok(stats) => Some(stats),
                Err(e) => {
                    error!(indicator = %name, error = %e, "갱신 작업 비정상 종료");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breconomy_data::testing::{series, StubSource};
    use breconomy_data::{IndicatorCache, IndicatorStore, MemoryCache, MemoryIndicatorStore};
    use std::sync::Arc;
    use std::time::Duration;

    fn job(name: &str, code: u32) -> RefreshJobConfig {
        RefreshJobConfig {
            name: name.to_string(),
            source_path: format!("dados/serie/bcdata.sgs.{code}/dados/ultimos/1?formato=json"),
            cache_key: format!("indicador:{}", name.to_lowercase()),
            update_interval: Duration::from_secs(3600),
            initial_delay: Duration::from_secs(1),
            cache_ttl: Duration::from_secs(7200),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_job_does_not_delay_other_jobs() {
        let slow = job("SELIC", 432);
        let fast = job("DOLAR", 1);

        let source = Arc::new(
            StubSource::new()
                .with_reply(&slow.source_path, series("27/01/2026", "11.25"))
                .with_delay(&slow.source_path, Duration::from_secs(25))
                .with_reply(&fast.source_path, series("27/01/2026", "5.4321")),
        );
        let store = Arc::new(MemoryIndicatorStore::new());
        let deps = RefreshDeps {
            store: store.clone(),
            cache: IndicatorCache::new(Arc::new(MemoryCache::new())),
            source,
        };

        let shutdown = CancellationToken::new();
        let scheduler = spawn_refresh_jobs(vec![slow, fast], deps, shutdown.clone());
        assert_eq!(scheduler.names(), vec!["SELIC", "DOLAR"]);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(store.find_by_name("DOLAR").await.unwrap().is_some());
        assert!(store.find_by_name("SELIC").await.unwrap().is_none());

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(store.find_by_name("SELIC").await.unwrap().is_some());

        let stats = scheduler.shutdown().await;
        assert_eq!(stats.len(), 2);
        assert!(stats.iter().all(|s| s.updated == 1));
    }
}
