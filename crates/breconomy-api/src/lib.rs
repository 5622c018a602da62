//! # BrEconomy API
//!
//! 브라질 경제 지표 조회 REST API 서버.
//!
//! 갱신 작업(`breconomy-collector`)과 같은 프로세스에서 실행되며 저장소, 캐시,
//! 업스트림 클라이언트를 공유합니다.
//!
//! - **routes**: 지표 조회, 헬스 체크
//! - **middleware**: HTTP 메트릭, IP별 rate limiting
//! - **openapi**: Swagger UI
//! - **app**: 레이어를 포함한 전체 라우터

pub mod app;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use app::create_router;
pub use error::{ApiErrorResponse, ApiResult};
pub use routes::create_api_router;
pub use state::AppState;
