//! Tracing setup and request counters

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

/// Install the global `fmt` subscriber.
///
/// `RUST_LOG` wins over `default_filter` when set.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Counters for the download endpoint
#[derive(Debug, Default)]
pub struct Metrics {
    requests_accepted: AtomicU64,
    requests_failed: AtomicU64,
    media_failures: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_accepted(&self) {
        self.requests_accepted.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "requests_accepted", "Metric incremented");
    }

    pub fn request_failed(&self) {
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "requests_failed", "Metric incremented");
    }

    pub fn media_failed(&self) {
        self.media_failures.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "media_failures", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_accepted: self.requests_accepted.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
            media_failures: self.media_failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub requests_accepted: u64,
    pub requests_failed: u64,
    pub media_failures: u64,
}
