use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::adlib::{ParameterSet, ResultSet};
use crate::media::MediaOutcome;

/// Body returned by a successful download
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadResponse {
    pub project: ProjectInfo,
    pub summary: Summary,
    pub ads: ResultSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub name: String,
    /// ISO-8601, UTC, `Z` suffix
    pub requested_at: String,
    /// Parameters the metadata client ran with
    pub parameters: ParameterSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_ads: usize,
    pub media: MediaOutcome,
}

/// Compose the response payload. No validation happens here.
pub fn assemble(
    project_name: String,
    requested_at: DateTime<Utc>,
    parameters: ParameterSet,
    media: MediaOutcome,
    ads: ResultSet,
) -> DownloadResponse {
    DownloadResponse {
        project: ProjectInfo {
            name: project_name,
            requested_at: requested_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            parameters,
        },
        summary: Summary {
            total_ads: ads.len(),
            media,
        },
        ads,
    }
}
