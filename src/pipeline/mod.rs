//! Download orchestration
//!
//! One run per request: derive the project name, build a metadata client,
//! fetch the ad records, refresh snapshot tokens, download media, then
//! assemble the response. Stages run strictly in order. Any metadata
//! failure aborts the run; media failures are folded into the response.

mod media;
mod response;

pub use media::{plan_media_job, run_media_stage};
pub use response::{DownloadResponse, ProjectInfo, Summary, assemble};

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{Span, debug, info};

use crate::adlib::{ClientError, ClientFactory, SNAPSHOT_URL_FIELD, refresh_snapshot_tokens};
use crate::api::models::ValidatedRequest;
use crate::media::{MediaDownloader, MediaOutcome};
use crate::normalize::{self, Defaults};

/// Terminal pipeline failures
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to initialise the Ad Library client: {0}")]
    ClientInit(#[source] ClientError),
    #[error("invalid query parameters: {0}")]
    Parameter(#[source] ClientError),
    #[error("failed to fetch ads: {0}")]
    Fetch(#[source] ClientError),
    #[error("no ads found for the given parameters")]
    EmptyResult,
}

/// Runs download requests against the configured collaborators.
///
/// Holds no per-request state; one instance is shared by all requests.
pub struct DownloadPipeline {
    clients: Arc<dyn ClientFactory>,
    media: Arc<dyn MediaDownloader>,
    defaults: Defaults,
}

impl DownloadPipeline {
    pub fn new(
        clients: Arc<dyn ClientFactory>,
        media: Arc<dyn MediaDownloader>,
        defaults: Defaults,
    ) -> Self {
        Self {
            clients,
            media,
            defaults,
        }
    }

    pub async fn run(&self, request: ValidatedRequest) -> Result<DownloadResponse, PipelineError> {
        let requested_at = Utc::now();
        let project_name = request
            .project_name
            .clone()
            .unwrap_or_else(|| normalize::derive_project_name(requested_at));
        Span::current().record("project", project_name.as_str());

        let mut client = self
            .clients
            .create(&request.credential, &project_name)
            .map_err(PipelineError::ClientInit)?;

        let params = normalize::build_parameters(&request, &self.defaults, requested_at.date_naive());
        debug!(project = %project_name, params = ?params, "Assembled query parameters");
        client
            .add_parameters(params)
            .map_err(PipelineError::Parameter)?;

        let mut ads = match client.fetch().await.map_err(PipelineError::Fetch)? {
            Some(ads) if !ads.is_empty() => ads,
            _ => return Err(PipelineError::EmptyResult),
        };
        info!(project = %project_name, rows = ads.len(), "Fetched ads");

        let media = if ads.has_column(SNAPSHOT_URL_FIELD) {
            let refreshed = refresh_snapshot_tokens(&mut ads, &request.credential);
            debug!(project = %project_name, refreshed, "Refreshed snapshot tokens");

            run_media_stage(self.media.as_ref(), &project_name, &request, ads.rows()).await
        } else {
            debug!(project = %project_name, "No snapshot URLs, skipping media stage");
            MediaOutcome::default()
        };

        Ok(assemble(
            project_name,
            requested_at,
            client.parameters(),
            media,
            ads,
        ))
    }
}
