//! 갱신 통계 구조체.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::modules::CycleOutcome;

/// 지표 갱신 작업 통계
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshStats {
    /// 지표 이름
    pub indicator: String,
    /// 실행한 주기 수
    pub cycles: usize,
    /// 저장소 갱신 성공
    pub updated: usize,
    /// 검증 실패/빈 응답으로 건너뜀
    pub skipped: usize,
    /// 업스트림/저장소 에러
    pub failed: usize,
    /// 저장소는 갱신했으나 캐시 기록 실패
    pub cache_errors: usize,
    /// 누적 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl RefreshStats {
    /// 새 통계 객체 생성
    pub fn new(indicator: impl Into<String>) -> Self {
        Self {
            indicator: indicator.into(),
            ..Default::default()
        }
    }

    /// 한 주기의 결과를 반영합니다. 취소된 주기는 세지 않습니다.
    pub fn record(&mut self, outcome: &CycleOutcome, elapsed: Duration) {
        match outcome {
            CycleOutcome::Cancelled => return,
            CycleOutcome::Updated { cached, .. } => {
                self.updated += 1;
                if !cached {
                    self.cache_errors += 1;
                }
            }
            CycleOutcome::Skipped(_) => self.skipped += 1,
            CycleOutcome::Failed(_) => self.failed += 1,
        }
        self.cycles += 1;
        self.elapsed += elapsed;
    }

    /// 성공률 계산 (%)
    pub fn success_rate(&self) -> f64 {
        if self.cycles == 0 {
            0.0
        } else {
            (self.updated as f64 / self.cycles as f64) * 100.0
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self) {
        tracing::info!(
            indicator = %self.indicator,
            cycles = self.cycles,
            updated = self.updated,
            skipped = self.skipped,
            failed = self.failed,
            cache_errors = self.cache_errors,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "갱신 작업 통계"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::SkipReason;
    use breconomy_data::DataError;

    #[test]
    fn test_record_outcomes() {
        let mut stats = RefreshStats::new("SELIC");
        let tick = Duration::from_millis(100);

        stats.record(&CycleOutcome::Skipped(SkipReason::EmptySeries), tick);
        stats.record(&CycleOutcome::Failed(DataError::Timeout("30s".into())), tick);
        stats.record(&CycleOutcome::Cancelled, tick);

        assert_eq!(stats.cycles, 2);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.success_rate(), 0.0);
        assert_eq!(stats.elapsed, Duration::from_millis(200));
    }
}
