use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;

use super::models::ErrorResponse;
use super::validation::RequestValidationError;
use crate::pipeline::PipelineError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("payload invalid: {0}")]
    InvalidPayload(String),
    #[error("payload too large: {0} bytes")]
    PayloadTooLarge(usize),
    #[error("validation failed: {0}")]
    Validation(#[from] RequestValidationError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidPayload(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Pipeline(err) => match err {
                PipelineError::ClientInit(_) | PipelineError::Parameter(_) => {
                    StatusCode::BAD_REQUEST
                }
                PipelineError::Fetch(_) => StatusCode::BAD_GATEWAY,
                PipelineError::EmptyResult => StatusCode::NOT_FOUND,
            },
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidPayload(_) => "INVALID_PAYLOAD",
            ApiError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ApiError::Validation(_) => "VALIDATION_FAILED",
            ApiError::Pipeline(err) => match err {
                PipelineError::ClientInit(_) => "CLIENT_INIT_FAILED",
                PipelineError::Parameter(_) => "PARAMETER_ERROR",
                PipelineError::Fetch(_) => "FETCH_FAILED",
                PipelineError::EmptyResult => "NO_ADS_FOUND",
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = ErrorResponse {
            code: self.code(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        ApiError::InvalidPayload(value.to_string())
    }
}
