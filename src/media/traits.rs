use async_trait::async_trait;
use thiserror::Error;

use super::http::DownloadError;
use super::types::{MediaJob, MediaOutcome};
use crate::storage::StorageError;

/// Errors that stop a media batch from running at all.
///
/// Failures of individual ads are counted in [`MediaOutcome`] instead.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("invalid media job: {0}")]
    InvalidJob(String),
    #[error("HTTP client unavailable: {0}")]
    Http(#[from] DownloadError),
    #[error("storage unavailable: {0}")]
    Storage(#[from] StorageError),
    #[error("media download failed: {0}")]
    Failed(String),
}

/// Downloads creative assets for a set of ad rows
#[async_trait]
pub trait MediaDownloader: Send + Sync {
    async fn download(&self, job: MediaJob) -> Result<MediaOutcome, MediaError>;
}
