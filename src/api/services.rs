use std::collections::HashMap;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use super::{
    models::{DownloadRequest, HealthResponse},
    state::AppState,
    utils,
    validation::validate_request,
};
use crate::api::error::ApiError;
use crate::config::StorageProvider;
use crate::pipeline::DownloadResponse;

/// Download endpoint (POST /download)
///
/// ## Flow:
/// 1. Require `application/json`, read the (decompressed) body within the
///    configured size limit
/// 2. Decode against the strict request schema and validate it
/// 3. Run the download pipeline: metadata query, token refresh, media
/// 4. Return 200 with the assembled payload
///
/// Validation, client setup and parameter errors are 400, an upstream
/// fetch failure is 502, an empty result is 404. Media failures are
/// reported inside `summary.media` and never change the status.
pub async fn download_ads(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> Result<Json<DownloadResponse>, ApiError> {
    let request_id = Uuid::now_v7();
    let span = info_span!("download", %request_id, project = tracing::field::Empty);

    let result = handle_download(&state, &headers, body).instrument(span.clone()).await;

    span.in_scope(|| match &result {
        Ok(response) => {
            state.metrics.request_accepted();
            if response.summary.media.error.is_some() {
                state.metrics.media_failed();
            }
            info!(
                project = %response.project.name,
                total_ads = response.summary.total_ads,
                media_succeeded = response.summary.media.succeeded,
                "Download completed"
            );
        }
        Err(e) => {
            state.metrics.request_failed();
            warn!(code = e.code(), error = %e, "Download rejected");
        }
    });

    result.map(Json)
}

async fn handle_download(
    state: &AppState,
    headers: &HeaderMap,
    body: Body,
) -> Result<DownloadResponse, ApiError> {
    utils::require_json(headers)?;

    let max_size = usize::try_from(state.config.server.api.max_payload_bytes.as_u64())
        .unwrap_or(usize::MAX);
    let body_bytes = utils::read_body(body, max_size).await?;

    let request: DownloadRequest = serde_json::from_slice(&body_bytes)?;
    let request = validate_request(request)?;

    Ok(state.pipeline.run(request).await?)
}

/// Health check endpoint (GET /health)
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let mut components = HashMap::new();
    components.insert("api".to_string(), "healthy".to_string());
    components.insert("adlib".to_string(), state.config.adlib.graph_base_url.clone());
    components.insert(
        "storage".to_string(),
        match state.config.media.storage {
            StorageProvider::Local => format!("local:{}", state.config.media.output_dir.display()),
            StorageProvider::Memory => "memory".to_string(),
        },
    );

    let response = HealthResponse {
        status: "healthy".to_string(),
        components,
        version: env!("CARGO_PKG_VERSION").to_string(),
        counters: state.metrics.snapshot(),
    };

    (StatusCode::OK, Json(response))
}
