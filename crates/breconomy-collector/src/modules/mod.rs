//! 갱신 모듈.

pub mod refresh;
pub mod scheduler;

pub use refresh::{run_cycle, run_refresh_job, CycleOutcome, RefreshDeps, SkipReason};
pub use scheduler::{spawn_refresh_jobs, RefreshScheduler};
