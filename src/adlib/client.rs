use async_trait::async_trait;
use thiserror::Error;

use super::types::{ParameterSet, ResultSet};

/// Metadata client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid credential: {0}")]
    InvalidCredential(String),
    #[error("invalid project name: {0}")]
    InvalidProjectName(String),
    #[error("invalid parameter '{key}': {reason}")]
    InvalidParameter { key: String, reason: String },
    #[error("client setup failed: {0}")]
    Setup(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("Ad Library API error: {0}")]
    Upstream(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Ad Library query client.
///
/// One instance serves exactly one request: parameters are added once,
/// the query runs once, and the instance is dropped with the request.
#[async_trait]
pub trait AdLibraryClient: Send + Sync {
    /// Merge query parameters into the client's parameter set
    fn add_parameters(&mut self, params: ParameterSet) -> Result<(), ClientError>;

    /// Parameters currently configured on the client (never the credential)
    fn parameters(&self) -> ParameterSet;

    /// Run the query. `Ok(None)` means the service returned no result set.
    async fn fetch(&self) -> Result<Option<ResultSet>, ClientError>;
}

/// Builds a fresh client for each request.
pub trait ClientFactory: Send + Sync {
    fn create(
        &self,
        credential: &str,
        project_name: &str,
    ) -> Result<Box<dyn AdLibraryClient>, ClientError>;
}
