//! Rate limiting middleware.
//!
//! 클라이언트 IP별 고정 윈도우 카운터. 윈도우 안에서 `max_requests`를 넘으면
//! 윈도우가 끝날 때까지 429를 반환합니다.

use axum::{
    extract::{Request, State},
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use breconomy_core::RateLimitSettings;
use metrics::counter;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::ApiErrorResponse;

/// Rate Limiter 설정.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// 윈도우당 최대 요청 수
    pub max_requests: u32,
    /// 윈도우 길이
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }
}

impl From<&RateLimitSettings> for RateLimitConfig {
    fn from(settings: &RateLimitSettings) -> Self {
        Self::new(
            settings.max_requests,
            Duration::from_secs(settings.window_secs),
        )
    }
}

#[derive(Debug)]
struct FixedWindow {
    started: Instant,
    count: u32,
}

/// Rate Limiter.
///
/// IP 주소별로 윈도우를 따로 셉니다.
#[derive(Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Arc<RwLock<HashMap<IpAddr, FixedWindow>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// 요청 허용 여부 확인.
    pub async fn check(&self, ip: IpAddr) -> RateLimitResult {
        let now = Instant::now();
        let mut windows = self.windows.write().await;

        let window = windows.entry(ip).or_insert(FixedWindow {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) >= self.config.window {
            window.started = now;
            window.count = 0;
        }

        if window.count < self.config.max_requests {
            window.count += 1;
            RateLimitResult::Allowed
        } else {
            let remaining = self
                .config
                .window
                .saturating_sub(now.duration_since(window.started));
            RateLimitResult::Limited {
                retry_after: remaining.as_secs_f64().ceil().max(1.0) as u64,
            }
        }
    }

    /// 끝난 윈도우 정리.
    pub async fn cleanup(&self) {
        let now = Instant::now();
        let window = self.config.window;
        self.windows
            .write()
            .await
            .retain(|_, w| now.duration_since(w.started) < window);
    }

    /// 현재 추적 중인 IP 수.
    pub async fn tracked_ips(&self) -> usize {
        self.windows.read().await.len()
    }

    /// 윈도우 길이마다 정리를 실행하는 백그라운드 태스크.
    pub fn spawn_cleanup(&self, shutdown: CancellationToken) -> JoinHandle<()> {
        let limiter = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(limiter.config.window) => limiter.cleanup().await,
                }
            }
        })
    }
}

/// Rate Limit 확인 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    Allowed,
    Limited {
        /// 재시도까지 대기 시간 (초)
        retry_after: u64,
    },
}

/// Rate Limit 미들웨어 상태.
#[derive(Clone)]
pub struct RateLimitState {
    limiter: RateLimiter,
}

impl RateLimitState {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            limiter: RateLimiter::new(config),
        }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}

/// Rate Limiting 미들웨어 함수.
pub async fn rate_limit_middleware(
    State(state): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Response {
    let ip = extract_client_ip(&request);

    match state.limiter.check(ip).await {
        RateLimitResult::Allowed => {
            counter!("rate_limit_requests_total", "status" => "allowed").increment(1);
            next.run(request).await
        }
        RateLimitResult::Limited { retry_after } => {
            counter!("rate_limit_requests_total", "status" => "limited").increment(1);
            tracing::warn!(client_ip = %ip, retry_after, "Rate limit exceeded");

            let mut response = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(ApiErrorResponse::new(
                    "RATE_LIMITED",
                    "Rate limit exceeded. Please try again later.",
                )),
            )
                .into_response();
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after));
            response
        }
    }
}

/// 요청에서 클라이언트 IP 추출.
///
/// 프록시 뒤에 있을 경우를 위해 X-Forwarded-For, X-Real-IP 헤더를 먼저 봅니다.
fn extract_client_ip(request: &Request) -> IpAddr {
    let header_ip = |name: &str| {
        request
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse::<IpAddr>().ok())
    };

    header_ip("x-forwarded-for")
        .or_else(|| header_ip("x-real-ip"))
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http, middleware, routing::get, Router};
    use tower::ServiceExt;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_window_limits_and_resets() {
        let limiter = RateLimiter::new(RateLimitConfig::new(3, Duration::from_secs(60)));
        let client = ip("192.168.1.1");

        for _ in 0..3 {
            assert_eq!(limiter.check(client).await, RateLimitResult::Allowed);
        }

        tokio::time::advance(Duration::from_secs(20)).await;
        assert_eq!(
            limiter.check(client).await,
            RateLimitResult::Limited { retry_after: 40 }
        );

        tokio::time::advance(Duration::from_secs(40)).await;
        assert_eq!(limiter.check(client).await, RateLimitResult::Allowed);
    }

    #[tokio::test]
    async fn test_rate_limiter_different_ips() {
        let limiter = RateLimiter::new(RateLimitConfig::new(1, Duration::from_secs(60)));

        assert_eq!(limiter.check(ip("10.0.0.1")).await, RateLimitResult::Allowed);
        assert!(matches!(
            limiter.check(ip("10.0.0.1")).await,
            RateLimitResult::Limited { .. }
        ));
        assert_eq!(limiter.check(ip("10.0.0.2")).await, RateLimitResult::Allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_drops_finished_windows() {
        let limiter = RateLimiter::new(RateLimitConfig::new(5, Duration::from_secs(10)));
        limiter.check(ip("10.0.0.1")).await;
        assert_eq!(limiter.tracked_ips().await, 1);

        tokio::time::advance(Duration::from_secs(11)).await;
        limiter.cleanup().await;
        assert_eq!(limiter.tracked_ips().await, 0);
    }

    #[test]
    fn test_config_from_settings() {
        let config = RateLimitConfig::from(&RateLimitSettings::default());
        assert_eq!(config.max_requests, 100);
        assert_eq!(config.window, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_middleware_returns_429_with_retry_after() {
        let state = RateLimitState::new(RateLimitConfig::new(1, Duration::from_secs(60)));
        let app = Router::new()
            .route("/", get(|| async { "OK" }))
            .layer(middleware::from_fn_with_state(state, rate_limit_middleware));

        let request = || {
            http::Request::builder()
                .uri("/")
                .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
                .body(Body::empty())
                .unwrap()
        };

        let response = app.clone().oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key(RETRY_AFTER));
    }

    #[test]
    fn test_extract_client_ip() {
        let request = http::Request::builder()
            .header("x-real-ip", "198.51.100.4")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_client_ip(&request), ip("198.51.100.4"));

        let request = http::Request::builder().body(Body::empty()).unwrap();
        assert_eq!(extract_client_ip(&request), ip("127.0.0.1"));
    }
}
