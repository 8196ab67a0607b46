//! HTTP client for snapshot pages and creative assets

use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::MediaConfig;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Connection timeout")]
    Timeout,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Too many redirects")]
    TooManyRedirects,
}

pub type Result<T> = std::result::Result<T, DownloadError>;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_retries: u32,
    /// First retry delay; doubles on each further attempt
    pub retry_backoff: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            max_retries: 3,
            retry_backoff: Duration::from_secs(1),
            user_agent: concat!("adfetch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl From<&MediaConfig> for HttpConfig {
    fn from(config: &MediaConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            max_retries: config.max_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Retrying HTTP fetcher
pub struct HttpClient {
    client: Client,
    config: HttpConfig,
}

impl HttpClient {
    pub fn new(config: HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| DownloadError::RequestFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Fetch a page body as text
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let bytes = self.download(url).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Download a resource with retry
    pub async fn download(&self, url: &str) -> Result<Bytes> {
        if reqwest::Url::parse(url).is_err() {
            return Err(DownloadError::InvalidUrl(url.to_string()));
        }

        let mut attempts = 0;

        loop {
            attempts += 1;

            match self.download_once(url).await {
                Ok(bytes) => {
                    if attempts > 1 {
                        debug!(url, attempts, "Download succeeded after retry");
                    }
                    return Ok(bytes);
                }
                Err(e) => {
                    let last_error = e.to_string();

                    if attempts >= self.config.max_retries {
                        warn!(url, attempts, error = %last_error, "Download failed after retries");
                        return Err(DownloadError::RequestFailed(format!(
                            "Failed after {} attempts: {}",
                            attempts, last_error
                        )));
                    }

                    warn!(url, attempts, error = %last_error, "Download failed, retrying");

                    let backoff = self.config.retry_backoff * 2u32.pow(attempts - 1);
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }

    /// Download once (no retry)
    async fn download_once(&self, url: &str) -> Result<Bytes> {
        debug!(url, "Starting download");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                DownloadError::Timeout
            } else if e.is_redirect() {
                DownloadError::TooManyRedirects
            } else {
                DownloadError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::RequestFailed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DownloadError::RequestFailed(format!("Failed to read body: {}", e)))?;

        debug!(url, size = bytes.len(), "Download completed");

        Ok(bytes)
    }
}
