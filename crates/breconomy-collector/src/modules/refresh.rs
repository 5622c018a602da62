//! 지표 갱신 작업.
//!
//! 한 주기: 업스트림 조회 → 첫 항목 검증 → 저장소 upsert → 캐시 기록.
//! 어떤 실패도 작업을 종료시키지 않으며, 다음 주기까지 `update_interval`만큼 기다린 뒤
//! 다시 시도합니다 (지수 백오프 없음).

use std::sync::Arc;

use breconomy_core::{
    indicator_span, CoreError, IndicatorRecord, IndicatorSnapshot, IndicatorUpdate,
};
use breconomy_data::{DataError, IndicatorCache, IndicatorStore, SeriesSource};
use chrono::Utc;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn, Instrument};

use crate::config::RefreshJobConfig;
use crate::stats::RefreshStats;

/// 갱신 작업이 공유하는 협력자.
#[derive(Clone)]
pub struct RefreshDeps {
    pub store: Arc<dyn IndicatorStore>,
    pub cache: IndicatorCache,
    pub source: Arc<dyn SeriesSource>,
}

/// 저장 없이 건너뛴 사유.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// 업스트림이 빈 배열/`null` 반환
    EmptySeries,
    /// 값이 불변 형식 소수가 아님
    InvalidValue(String),
    /// 기준일이 `DD/MM/YYYY`가 아님
    InvalidDate(String),
}

/// 한 주기의 결과.
#[derive(Debug)]
pub enum CycleOutcome {
    /// 저장소 갱신 성공. `cached`는 캐시 기록 성공 여부.
    Updated { record: IndicatorRecord, cached: bool },
    /// 페이로드 문제로 건너뜀 (쓰기 없음)
    Skipped(SkipReason),
    /// 업스트림 또는 저장소 실패 (캐시 기록 없음)
    Failed(DataError),
    /// 종료 신호로 중단 (쓰기 없음)
    Cancelled,
}

impl CycleOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Updated { .. } => "updated",
            Self::Skipped(_) => "skipped",
            Self::Failed(_) => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// 갱신 주기를 한 번 실행합니다.
///
/// 업스트림 조회 중 `shutdown`이 취소되면 조회를 버리고 쓰기 없이 반환합니다.
pub async fn run_cycle(
    config: &RefreshJobConfig,
    deps: &RefreshDeps,
    shutdown: &CancellationToken,
) -> CycleOutcome {
    let fetched = tokio::select! {
        biased;
        _ = shutdown.cancelled() => return CycleOutcome::Cancelled,
        result = deps.source.fetch_series(&config.source_path) => result,
    };

    let records = match fetched {
        Ok(records) => records,
        Err(e) => {
            if e.is_transient() {
                warn!(error = %e, "업스트림 요청 실패, 다음 주기에 재시도");
            } else {
                error!(error = %e, "업스트림 응답 처리 실패");
            }
            return CycleOutcome::Failed(e);
        }
    };

    let Some(first) = records.first() else {
        warn!("업스트림 응답이 비어 있음, 이번 주기 건너뜀");
        return CycleOutcome::Skipped(SkipReason::EmptySeries);
    };

    let update = match IndicatorUpdate::from_series(&config.name, first) {
        Ok(update) => update,
        Err(CoreError::InvalidValue { raw }) => {
            warn!(value = %raw, "지표 값 파싱 실패, 이번 주기 건너뜀");
            return CycleOutcome::Skipped(SkipReason::InvalidValue(raw));
        }
        Err(CoreError::InvalidDate { raw }) => {
            error!(date = %raw, "기준일 형식 오류 (DD/MM/YYYY 아님), 이번 주기 건너뜀");
            return CycleOutcome::Skipped(SkipReason::InvalidDate(raw));
        }
        Err(e) => {
            error!(error = %e, "업스트림 항목 검증 실패");
            return CycleOutcome::Skipped(SkipReason::InvalidValue(first.value.clone()));
        }
    };

    if shutdown.is_cancelled() {
        return CycleOutcome::Cancelled;
    }

    let now = Utc::now();
    let record = match deps.store.upsert(&update, now).await {
        Ok(record) => record,
        Err(e) => {
            error!(error = %e, "저장소 갱신 실패, 캐시도 갱신하지 않음");
            return CycleOutcome::Failed(e);
        }
    };

    let snapshot = IndicatorSnapshot::from_update(&update, now);
    let cached = match deps
        .cache
        .put_snapshot(&config.cache_key, &snapshot, config.cache_ttl)
        .await
    {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "캐시 기록 실패, 저장소 값은 유지");
            false
        }
    };

    info!(
        value = %record.value,
        reference_date = %snapshot.date,
        cached,
        "지표 갱신 완료"
    );

    CycleOutcome::Updated { record, cached }
}

/// 지표 갱신 작업을 실행합니다.
///
/// `initial_delay` 후 첫 주기를 실행하고, 이후 `update_interval` 간격으로 반복합니다.
/// `shutdown`이 취소되면 대기 중이든 조회 중이든 즉시 종료하고 통계를 반환합니다.
pub async fn run_refresh_job(
    config: RefreshJobConfig,
    deps: RefreshDeps,
    shutdown: CancellationToken,
) -> RefreshStats {
    let span = indicator_span!("refresh_job", config.name, config.cache_key);

    async move {
        let mut stats = RefreshStats::new(&config.name);

        info!(
            interval_secs = config.update_interval.as_secs(),
            initial_delay_secs = config.initial_delay.as_secs(),
            "지표 갱신 작업 시작"
        );

        tokio::select! {
            _ = sleep(config.initial_delay) => {}
            _ = shutdown.cancelled() => {
                info!("종료 신호 수신 (초기 대기 중)");
                return stats;
            }
        }

        loop {
            let started = Instant::now();
            let outcome = run_cycle(&config, &deps, &shutdown).await;
            if matches!(outcome, CycleOutcome::Cancelled) {
                info!("종료 신호 수신 (주기 실행 중)");
                break;
            }

            stats.record(&outcome, started.elapsed());
            metrics::counter!(
                "indicator_refresh_cycles_total",
                "indicator" => config.name.clone(),
                "outcome" => outcome.label()
            )
            .increment(1);

            info!(
                next_run_secs = config.update_interval.as_secs(),
                "다음 갱신 대기"
            );

            tokio::select! {
                _ = sleep(config.update_interval) => {}
                _ = shutdown.cancelled() => {
                    info!("종료 신호 수신 (대기 중)");
                    break;
                }
            }
        }

        stats.log_summary();
        stats
    }
    .instrument(span)
    .await
}
