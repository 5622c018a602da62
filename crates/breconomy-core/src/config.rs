//! 설정 관리.
//!
//! 기본값 → `config/default.toml` (있을 경우) → `BRECONOMY__` 접두 환경 변수 순으로
//! 덮어씁니다. `DATABASE_URL`, `REDIS_URL`, `API_HOST`, `API_PORT`도 인식합니다.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 데이터베이스 설정
    pub database: DatabaseConfig,
    /// Redis 설정
    pub redis: RedisConfig,
    /// 업스트림(중앙은행 API) 설정
    pub source: SourceConfig,
    /// 지표 갱신 작업 설정
    pub refresh: RefreshConfig,
    /// 요청 제한 설정
    pub rate_limit: RateLimitSettings,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 요청 처리 타임아웃 (초)
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            request_timeout_secs: 30,
        }
    }
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// 연결 URL. 없으면 인메모리 저장소로 동작합니다.
    pub url: Option<String>,
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 타임아웃 (초)
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            connect_timeout_secs: 30,
        }
    }
}

/// Redis 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedisConfig {
    /// 연결 URL. 없으면 인메모리 캐시로 동작합니다.
    pub url: Option<String>,
    /// 조회 경로의 캐시 복구 시 TTL (초)
    pub fallback_ttl_secs: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: None,
            fallback_ttl_secs: 3600,
        }
    }
}

impl RedisConfig {
    pub fn fallback_ttl(&self) -> Duration {
        Duration::from_secs(self.fallback_ttl_secs)
    }
}

/// 업스트림 데이터 제공자 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceConfig {
    /// 기준 URL (끝의 `/` 포함)
    pub base_url: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.bcb.gov.br/".to_string(),
            timeout_secs: 30,
        }
    }
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 지표 갱신 작업 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// API 프로세스 안에서 갱신 작업 실행 여부
    pub enabled: bool,
    /// 주기 간격 (초)
    pub update_interval_secs: u64,
    /// 첫 실행 전 대기 (초)
    pub initial_delay_secs: u64,
    /// 캐시 만료 = 주기 간격 + 이 여유분 (초)
    pub cache_margin_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            update_interval_secs: 24 * 60 * 60,
            initial_delay_secs: 2,
            cache_margin_secs: 60 * 60,
        }
    }
}

impl RefreshConfig {
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }

    pub fn cache_margin(&self) -> Duration {
        Duration::from_secs(self.cache_margin_secs)
    }
}

/// 요청 제한 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// 활성화 여부
    pub enabled: bool,
    /// 윈도우 길이 (초)
    pub window_secs: u64,
    /// 윈도우당 IP별 최대 요청 수
    pub max_requests: u32,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            window_secs: 60,
            max_requests: 100,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("BRECONOMY")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config: AppConfig = builder.build()?.try_deserialize()?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// 0이면 안 되는 주기/한도 값을 검사합니다.
    pub fn validate(&self) -> CoreResult<()> {
        let positive = [
            ("refresh.update_interval_secs", self.refresh.update_interval_secs),
            ("rate_limit.window_secs", self.rate_limit.window_secs),
            ("rate_limit.max_requests", u64::from(self.rate_limit.max_requests)),
        ];

        match positive.iter().find(|(_, value)| *value == 0) {
            Some((key, _)) => Err(CoreError::Config(format!("{} must be greater than 0", key))),
            None => Ok(()),
        }
    }

    /// 관례적인 환경 변수 이름을 반영합니다.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.is_empty()) {
            self.database.url = Some(url);
        }
        if let Some(url) = lookup("REDIS_URL").filter(|v| !v.is_empty()) {
            self.redis.url = Some(url);
        }
        if let Some(host) = lookup("API_HOST").filter(|v| !v.is_empty()) {
            self.server.host = host;
        }
        if let Some(port) = lookup("API_PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
    }
}
