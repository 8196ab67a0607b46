//! Request body helpers for the download endpoint

use axum::body::Body;
use axum::http::{HeaderMap, header::CONTENT_TYPE};
use http_body_util::BodyExt;

use crate::api::error::ApiError;

/// Require an `application/json` Content-Type (parameters such as
/// `charset` are allowed)
pub fn require_json(headers: &HeaderMap) -> Result<mime::Mime, ApiError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::InvalidPayload("missing Content-Type header".into()))?;

    parse_content_type(content_type)
}

/// Parse a Content-Type value and accept only `application/json`.
///
/// Rejects look-alikes such as `application/jsonp`,
/// `application/json-patch+json` and `text/json`.
pub fn parse_content_type(content_type: &str) -> Result<mime::Mime, ApiError> {
    let media_type: mime::Mime = content_type
        .parse()
        .map_err(|_| ApiError::InvalidPayload(format!("invalid Content-Type: {}", content_type)))?;

    if media_type.type_() != mime::APPLICATION || media_type.subtype() != mime::JSON {
        return Err(ApiError::InvalidPayload(format!(
            "Content-Type must be application/json, got: {}/{}",
            media_type.type_(),
            media_type.subtype()
        )));
    }

    Ok(media_type)
}

/// Collect the (already decompressed) body and enforce `max_size`
pub async fn read_body(body: Body, max_size: usize) -> Result<Vec<u8>, ApiError> {
    let data = body
        .collect()
        .await
        .map_err(|err| ApiError::InvalidPayload(format!("unreadable body: {err}")))?
        .to_bytes()
        .to_vec();

    validate_body_size(&data, max_size)?;
    Ok(data)
}

pub fn validate_body_size(data: &[u8], max_size: usize) -> Result<(), ApiError> {
    if data.len() > max_size {
        return Err(ApiError::PayloadTooLarge(data.len()));
    }
    Ok(())
}
