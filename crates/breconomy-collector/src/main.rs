//! Standalone indicator collector CLI.

use std::sync::Arc;

use breconomy_collector::{
    run_cycle, spawn_refresh_jobs, CycleOutcome, RefreshDeps, RefreshJobConfig, RefreshStats,
};
use breconomy_core::{init_logging, AppConfig, LogConfig};
use breconomy_data::{connect_cache, connect_store, BcbClient, IndicatorCache};
use clap::{Parser, Subcommand};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "breconomy-collector")]
#[command(about = "BrEconomy standalone indicator collector", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 설정 파일 경로
    #[arg(long, default_value = "config/default.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// 모든 지표 (또는 하나)를 한 번 갱신하고 종료
    RunOnce {
        /// 특정 지표만 갱신 (예: "SELIC", "IPCA_12M")
        #[arg(long)]
        indicator: Option<String>,
    },

    /// 데몬 모드: 지표별 갱신 작업을 종료 신호까지 실행
    Daemon,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)?;
    init_logging(LogConfig::from_env_or(&config.logging))?;

    tracing::info!("BrEconomy Collector 시작");

    let deps = RefreshDeps {
        store: connect_store(&config.database).await?,
        cache: IndicatorCache::new(connect_cache(&config.redis).await),
        source: Arc::new(BcbClient::new(&config.source)?),
    };

    match cli.command {
        Commands::RunOnce { indicator } => {
            let jobs = RefreshJobConfig::select(&config.refresh, indicator.as_deref())?;
            let shutdown = CancellationToken::new();
            let mut failed = Vec::new();

            for job in &jobs {
                let mut stats = RefreshStats::new(&job.name);
                let started = Instant::now();
                let outcome = run_cycle(job, &deps, &shutdown).await;
                stats.record(&outcome, started.elapsed());
                stats.log_summary();

                if matches!(outcome, CycleOutcome::Failed(_)) {
                    failed.push(job.name.clone());
                }
            }

            if !failed.is_empty() {
                return Err(format!("갱신 실패: {}", failed.join(", ")).into());
            }
        }
        Commands::Daemon => {
            let jobs = RefreshJobConfig::catalog(&config.refresh);
            tracing::info!(
                "=== 데몬 모드 시작 (지표 {}개, 주기: {}초) ===",
                jobs.len(),
                config.refresh.update_interval_secs
            );

            let shutdown = CancellationToken::new();
            let scheduler = spawn_refresh_jobs(jobs, deps, shutdown.clone());
            tracing::info!(jobs = ?scheduler.names(), "갱신 작업 실행 중");

            shutdown_signal().await;
            tracing::info!("종료 신호 수신, 데몬 종료 중...");
            scheduler.shutdown().await;
        }
    }

    tracing::info!("BrEconomy Collector 종료");
    Ok(())
}

/// Ctrl+C 또는 SIGTERM을 기다립니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Ctrl+C 핸들러 설치 실패");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "SIGTERM 핸들러 설치 실패");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
