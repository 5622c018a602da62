//! 중앙은행 (Banco Central do Brasil) SGS 시계열 클라이언트.
//!
//! `GET {base}/dados/serie/bcdata.sgs.{code}/dados/ultimos/1?formato=json`은
//! `[{"data": "DD/MM/YYYY", "valor": "<decimal>"}]`을 반환합니다.

use async_trait::async_trait;
use breconomy_core::{SeriesRecord, SourceConfig};
use reqwest::Client;
use tracing::debug;

use super::SeriesSource;
use crate::error::{DataError, Result};

/// SGS HTTP 클라이언트.
#[derive(Debug, Clone)]
pub struct BcbClient {
    client: Client,
    base_url: String,
}

impl BcbClient {
    /// 설정의 기준 URL과 타임아웃으로 클라이언트를 생성합니다.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("breconomy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DataError::ConfigError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn get_success(&self, path: &str) -> Result<reqwest::Response> {
        let url = self.url(path);
        debug!(url = %url, "BCB series request");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataError::UpstreamStatus {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl SeriesSource for BcbClient {
    async fn fetch_series(&self, path: &str) -> Result<Vec<SeriesRecord>> {
        let body = self.get_success(path).await?.text().await?;

        let records: Option<Vec<SeriesRecord>> = serde_json::from_str(&body)
            .map_err(|e| DataError::ParseError(format!("{}: {}", path, e)))?;

        Ok(records.unwrap_or_default())
    }

    async fn probe(&self, path: &str) -> Result<()> {
        self.get_success(path).await.map(|_| ())
    }
}
