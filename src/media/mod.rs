//! Media asset downloads (creative images and videos)
//!
//! - [`MediaDownloader`] - seam the pipeline calls into
//! - [`SnapshotDownloader`] - fetches assets referenced by snapshot pages
//! - [`MediaOutcome`] - per-batch counters and stored assets

pub mod http;
mod snapshot;
mod traits;
mod types;

pub use snapshot::{AssetExtractor, AssetSource, SnapshotDownloader, asset_key, select_rows};
pub use traits::{MediaDownloader, MediaError};
pub use types::{AssetKind, AssetRef, MediaJob, MediaOutcome};
