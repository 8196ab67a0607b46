use tracing::{info, warn};

use crate::adlib::{ResultRow, row_id};
use crate::api::models::ValidatedRequest;
use crate::media::{MediaDownloader, MediaJob, MediaOutcome};

/// Build the media job for a result set.
///
/// Returns `None` when no row survives the id filter. An explicit id
/// filter always disables random sampling.
pub fn plan_media_job(
    project_name: &str,
    request: &ValidatedRequest,
    rows: &[ResultRow],
) -> Option<MediaJob> {
    let subset: Vec<ResultRow> = match &request.media_ad_ids {
        Some(ids) => rows
            .iter()
            .filter(|row| row_id(row).is_some_and(|id| ids.contains(&id)))
            .cloned()
            .collect(),
        None => rows.to_vec(),
    };

    if subset.is_empty() {
        return None;
    }

    Some(MediaJob {
        project_name: project_name.to_string(),
        limit: request.media_limit.unwrap_or(subset.len()),
        random_sample: request.random_sample_media && request.media_ad_ids.is_none(),
        rows: subset,
    })
}

/// Run the media downloader; its failures are reported in the outcome,
/// never returned.
pub async fn run_media_stage(
    downloader: &dyn MediaDownloader,
    project_name: &str,
    request: &ValidatedRequest,
    rows: &[ResultRow],
) -> MediaOutcome {
    let Some(job) = plan_media_job(project_name, request, rows) else {
        info!(project = %project_name, "No rows selected for media download");
        return MediaOutcome::default();
    };

    let limit = job.limit;
    info!(
        project = %project_name,
        rows = job.rows.len(),
        limit,
        random_sample = job.random_sample,
        "Running media stage"
    );

    match downloader.download(job).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(project = %project_name, limit, error = %e, "Media stage failed");
            MediaOutcome::aborted(limit, e.to_string())
        }
    }
}
