use super::size::ByteSize;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub adlib: AdLibConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    /// Requests processed at once; further requests wait
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
    #[serde(default)]
    pub api: ApiLimits,
}

/// API request limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiLimits {
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: ByteSize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            max_concurrent_requests: default_max_concurrent_requests(),
            api: ApiLimits::default(),
        }
    }
}

impl Default for ApiLimits {
    fn default() -> Self {
        Self {
            max_payload_bytes: default_max_payload_bytes(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_max_concurrent_requests() -> usize {
    64
}

fn default_max_payload_bytes() -> ByteSize {
    ByteSize(1024 * 1024) // 1 MB
}

/// Ad Library (Graph API) client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdLibConfig {
    #[serde(default = "default_graph_base_url")]
    pub graph_base_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Rows requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Upper bound on pages followed for one query
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    #[serde(default = "default_adlib_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Country used when a request names none
    #[serde(default = "default_country")]
    pub default_country: String,
    /// Delivery start bound used when a request gives no `min` date
    #[serde(default = "default_start_date")]
    pub default_start_date: NaiveDate,
}

impl Default for AdLibConfig {
    fn default() -> Self {
        Self {
            graph_base_url: default_graph_base_url(),
            api_version: default_api_version(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            request_timeout_secs: default_adlib_timeout_secs(),
            default_country: default_country(),
            default_start_date: default_start_date(),
        }
    }
}

fn default_graph_base_url() -> String {
    "https://graph.facebook.com".to_string()
}

fn default_api_version() -> String {
    "v18.0".to_string()
}

fn default_page_size() -> u32 {
    300
}

fn default_max_pages() -> u32 {
    100
}

fn default_adlib_timeout_secs() -> u64 {
    60
}

fn default_country() -> String {
    "NL".to_string()
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default()
}

/// Where downloaded assets are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    #[default]
    Local,
    Memory,
}

/// Media downloader configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaConfig {
    #[serde(default)]
    pub storage: StorageProvider,
    /// Root directory for the local provider
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_media_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_max_assets_per_ad")]
    pub max_assets_per_ad: usize,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            storage: StorageProvider::default(),
            output_dir: default_output_dir(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_media_timeout_secs(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            user_agent: default_user_agent(),
            max_assets_per_ad: default_max_assets_per_ad(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_media_timeout_secs() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_user_agent() -> String {
    concat!("adfetch/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_max_assets_per_ad() -> usize {
    10
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}
