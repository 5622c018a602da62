//! 업스트림 시계열 제공자.

pub mod bcb;

use async_trait::async_trait;
use breconomy_core::SeriesRecord;

use crate::error::Result;

pub use bcb::BcbClient;

/// 지표 시계열 엔드포인트에 대한 제한 시간 있는 GET.
#[async_trait]
pub trait SeriesSource: Send + Sync {
    /// 경로의 시계열 항목을 가져옵니다. 본문이 `null`이면 빈 목록입니다.
    async fn fetch_series(&self, path: &str) -> Result<Vec<SeriesRecord>>;

    /// 경로가 성공 상태 코드로 응답하는지 확인합니다.
    async fn probe(&self, path: &str) -> Result<()>;
}
