use thiserror::Error;

use super::models::{DownloadRequest, Identifier, OneOrMany, ValidatedRequest};
use crate::adlib::ParameterSet;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestValidationError {
    #[error("media_limit must be a positive integer, got {0}")]
    InvalidLimit(i64),
    #[error("date_range.min ({min}) must not be after date_range.max ({max})")]
    InvalidDateRange { min: String, max: String },
    #[error("at least one of page_ids or ad_library_ids is required")]
    MissingIdentifier,
}

/// Check a decoded request and bring it into canonical shape.
///
/// Structural rules run before cross-field rules; the first violation
/// is returned.
pub fn validate_request(
    request: DownloadRequest,
) -> Result<ValidatedRequest, RequestValidationError> {
    let media_limit = match request.media_limit {
        Some(limit) if limit <= 0 => return Err(RequestValidationError::InvalidLimit(limit)),
        Some(limit) => Some(usize::try_from(limit).unwrap_or(usize::MAX)),
        None => None,
    };

    let range = request.date_range.unwrap_or_default();
    if let (Some(min), Some(max)) = (range.min, range.max) {
        if min > max {
            return Err(RequestValidationError::InvalidDateRange {
                min: min.to_string(),
                max: max.to_string(),
            });
        }
    }

    let page_ids = identifier_list(request.page_ids, true);
    let search_terms = identifier_list(request.ad_library_ids, false);
    if page_ids.is_none() && search_terms.is_none() {
        return Err(RequestValidationError::MissingIdentifier);
    }

    Ok(ValidatedRequest {
        credential: request.access_token.trim().to_string(),
        project_name: non_blank(request.project_name),
        countries: request
            .ad_reached_countries
            .map(|countries| strip_all(countries.into_list(true))),
        date_start: range.min,
        date_end: range.max,
        page_ids,
        search_terms,
        ad_type: request.ad_type.trim().to_string(),
        fields: non_blank(request.fields),
        media_limit,
        media_ad_ids: media_filter(request.media_ad_ids),
        random_sample_media: request.random_sample_media,
        extra_parameters: request.additional_parameters.unwrap_or_else(ParameterSet::new),
    })
}

/// Trimmed, non-empty identifiers; `None` when nothing usable is left
fn identifier_list(value: Option<OneOrMany>, split_commas: bool) -> Option<Vec<String>> {
    let list = strip_all(value?.into_list(split_commas));
    if list.is_empty() { None } else { Some(list) }
}

/// An empty list means no filter. A list of blanks stays a filter that
/// matches nothing.
fn media_filter(ids: Option<Vec<Identifier>>) -> Option<Vec<String>> {
    let ids = ids.filter(|ids| !ids.is_empty())?;
    Some(strip_all(ids.into_iter().map(Identifier::into_text).collect()))
}

fn strip_all(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
