//! Ad Library metadata access
//!
//! - [`AdLibraryClient`] / [`ClientFactory`] - seam the pipeline calls into
//! - [`GraphClient`] - Graph API implementation of that seam
//! - [`refresh_snapshot_tokens`] - rewrites tokens embedded in snapshot URLs
//! - [`ResultSet`] - ordered ad records returned by a query

mod client;
mod graph;
pub mod token;
mod types;

pub use client::{AdLibraryClient, ClientError, ClientFactory};
pub use graph::{GraphClient, GraphClientFactory};
pub use token::refresh_snapshot_tokens;
pub use types::{ID_FIELD, ParameterSet, ResultRow, ResultSet, SNAPSHOT_URL_FIELD, row_id};
