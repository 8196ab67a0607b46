use serde::{Deserialize, Serialize};

use crate::adlib::ResultRow;

/// Kind of creative asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Image,
    Video,
}

impl AssetKind {
    pub fn folder(&self) -> &'static str {
        match self {
            AssetKind::Image => "ads_images",
            AssetKind::Video => "ads_videos",
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            AssetKind::Image => "img",
            AssetKind::Video => "vid",
        }
    }
}

/// One stored creative asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRef {
    pub ad_id: String,
    pub kind: AssetKind,
    pub source_url: String,
    pub key: String,
    pub size: usize,
}

/// Result of a media download batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaOutcome {
    #[serde(rename = "ads_requested")]
    pub requested: usize,
    #[serde(rename = "ads_succeeded")]
    pub succeeded: usize,
    #[serde(rename = "ads_failed")]
    pub failed: usize,
    pub assets: Vec<AssetRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MediaOutcome {
    /// Outcome reported when the downloader could not run at all
    pub fn aborted(limit: usize, error: impl Into<String>) -> Self {
        Self {
            requested: limit,
            succeeded: 0,
            failed: limit,
            assets: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// Work handed to a [`super::MediaDownloader`]
#[derive(Debug, Clone)]
pub struct MediaJob {
    pub project_name: String,
    /// Maximum number of ads to process
    pub limit: usize,
    pub rows: Vec<ResultRow>,
    /// Sample `limit` rows at random instead of taking the first ones
    pub random_sample: bool,
}
