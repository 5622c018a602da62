//! BrEconomy API 서버.
//!
//! 지표 조회 REST API와 지표별 갱신 작업을 한 프로세스에서 실행합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use breconomy_api::create_router;
use breconomy_api::metrics::setup_metrics_recorder;
use breconomy_api::state::AppState;
use breconomy_collector::{spawn_refresh_jobs, RefreshDeps, RefreshJobConfig};
use breconomy_core::{init_logging, AppConfig, LogConfig};
use breconomy_data::{connect_cache, connect_store, BcbClient, IndicatorCache};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());
    let config = AppConfig::load(&config_path)
        .with_context(|| format!("설정 로드 실패: {}", config_path))?;

    init_logging(LogConfig::from_env_or(&config.logging))
        .map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    info!("Starting BrEconomy API server...");

    let metrics_handle = setup_metrics_recorder().context("Prometheus 레코더 설치 실패")?;
    info!("Prometheus metrics recorder initialized");

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "소켓 주소가 유효하지 않습니다 (API_HOST={}, API_PORT={})",
                config.server.host, config.server.port
            )
        })?;

    // 갱신 작업과 조회 핸들러가 같은 협력자를 공유
    let deps = RefreshDeps {
        store: connect_store(&config.database).await?,
        cache: IndicatorCache::new(connect_cache(&config.redis).await),
        source: Arc::new(BcbClient::new(&config.source)?),
    };

    let state = Arc::new(AppState::from_deps(&deps).with_fallback_ttl(config.redis.fallback_ttl()));
    info!(version = %state.version, "Application state initialized");

    let shutdown_token = CancellationToken::new();

    let scheduler = if config.refresh.enabled {
        let jobs = RefreshJobConfig::catalog(&config.refresh);
        let scheduler = spawn_refresh_jobs(jobs, deps, shutdown_token.clone());
        info!(
            jobs = ?scheduler.names(),
            interval_secs = config.refresh.update_interval_secs,
            "지표 갱신 작업 시작"
        );
        Some(scheduler)
    } else {
        warn!("지표 갱신 작업 비활성화 (refresh.enabled = false)");
        None
    };

    let (app, rate_limit) = create_router(state, metrics_handle, &config);
    if let Some(rate_limit) = &rate_limit {
        rate_limit.limiter().spawn_cleanup(shutdown_token.clone());
    }

    info!(%addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("Metrics available at http://{}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_token.clone()))
        .await?;

    info!("Server shutdown initiated, cleaning up...");
    shutdown_token.cancel();

    // 진행 중인 갱신 주기는 취소 지점에서 멈춤
    if let Some(scheduler) = scheduler {
        match tokio::time::timeout(Duration::from_secs(10), scheduler.join()).await {
            Ok(stats) => stats.iter().for_each(|s| s.log_summary()),
            Err(_) => warn!("Refresh jobs did not stop in time, forcing shutdown"),
        }
    }

    info!("Server stopped gracefully");
    Ok(())
}

/// Ctrl+C 또는 SIGTERM을 기다린 뒤 종료 토큰을 취소합니다.
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Ctrl+C 핸들러 설치 실패");
            std::future::pending::<()>().await;
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
        _ = ctrl_c => warn!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => warn!("Received SIGTERM, initiating graceful shutdown..."),
        _ = shutdown_token.cancelled() => {}
    }

    shutdown_token.cancel();
    info!("Shutdown signal propagated to background tasks");
}
