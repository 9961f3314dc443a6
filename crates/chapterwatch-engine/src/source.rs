use async_trait::async_trait;
use chapterwatch_core::config::ScrapeConfig;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

use crate::error::FetchError;

/// The remote page the poller scans.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the page body once.
    async fn fetch(&self) -> Result<String, FetchError>;
}

/// HTTP(S) GET against a fixed URL. Only `200 OK` counts as success.
pub struct HttpPageSource {
    client: reqwest::Client,
    url: String,
}

impl HttpPageSource {
    pub fn new(url: &str, timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub fn from_config(config: &ScrapeConfig) -> Result<Self, FetchError> {
        Self::new(&config.url, config.request_timeout(), &config.user_agent)
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self) -> Result<String, FetchError> {
        let resp = self.client.get(&self.url).send().await?;
        let status = resp.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = resp.text().await?;
        debug!(url = %self.url, bytes = body.len(), "page fetched");
        Ok(body)
    }
}
