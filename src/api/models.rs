//! API models for the `POST /download` endpoint.
//!
//! A complete request body (as JSON):
//!
//! ```json
//! {
//!   "access_token": "EAAB...",
//!   "project_name": "elections_nl",
//!   "ad_reached_countries": ["NL", "BE"],
//!   "date_range": { "min": "2024-01-01", "max": "2024-03-31" },
//!   "page_ids": ["123456789"],
//!   "ad_type": "POLITICAL_AND_ISSUE_ADS",
//!   "fields": "id,page_name,ad_snapshot_url",
//!   "media_limit": 10,
//!   "media_ad_ids": ["987654321"],
//!   "random_sample_media": true,
//!   "additional_parameters": { "languages": ["nl"] }
//! }
//! ```
//!
//! Unknown top-level keys are rejected. `ad_reached_countries` and
//! `page_ids` also accept a comma-separated string; `ad_library_ids`
//! accepts a single string. Identifiers may be JSON numbers.
//!
//! The response shape lives with the pipeline, see
//! [`crate::pipeline::DownloadResponse`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::HashMap;

use crate::adlib::ParameterSet;
use crate::observability::MetricsSnapshot;

/// Request body as received on the wire
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DownloadRequest {
    pub access_token: String,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub ad_reached_countries: Option<OneOrMany>,
    #[serde(default)]
    pub date_range: Option<DateRange>,
    #[serde(default)]
    pub page_ids: Option<OneOrMany>,
    #[serde(default)]
    pub ad_library_ids: Option<OneOrMany>,
    #[serde(default = "default_ad_type")]
    pub ad_type: String,
    #[serde(default)]
    pub fields: Option<String>,
    #[serde(default)]
    pub media_limit: Option<i64>,
    #[serde(default)]
    pub media_ad_ids: Option<Vec<Identifier>>,
    #[serde(default = "default_random_sample")]
    pub random_sample_media: bool,
    #[serde(default)]
    pub additional_parameters: Option<Map<String, Value>>,
}

fn default_ad_type() -> String {
    "ALL".to_string()
}

fn default_random_sample() -> bool {
    true
}

/// Delivery date window; `start`/`end` are accepted as aliases
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DateRange {
    #[serde(default, alias = "start")]
    pub min: Option<NaiveDate>,
    #[serde(default, alias = "end")]
    pub max: Option<NaiveDate>,
}

/// A string or a JSON number, carried as text
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    Text(String),
    Number(Number),
}

impl Identifier {
    pub fn into_text(self) -> String {
        match self {
            Identifier::Text(text) => text,
            Identifier::Number(number) => number.to_string(),
        }
    }
}

/// A single value or a list of them
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(Identifier),
    Many(Vec<Identifier>),
}

impl OneOrMany {
    /// Flatten to a list. With `split_commas`, a single string is split on
    /// commas and blank pieces are dropped; list entries are kept as-is.
    pub fn into_list(self, split_commas: bool) -> Vec<String> {
        match self {
            OneOrMany::One(Identifier::Text(text)) if split_commas => text
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect(),
            OneOrMany::One(one) => vec![one.into_text()],
            OneOrMany::Many(many) => many.into_iter().map(Identifier::into_text).collect(),
        }
    }
}

/// Request after schema validation; every value has its canonical shape
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub credential: String,
    pub project_name: Option<String>,
    pub countries: Option<Vec<String>>,
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
    pub page_ids: Option<Vec<String>>,
    /// Ad library identifiers, sent as search terms
    pub search_terms: Option<Vec<String>>,
    pub ad_type: String,
    pub fields: Option<String>,
    pub media_limit: Option<usize>,
    pub media_ad_ids: Option<Vec<String>>,
    pub random_sample_media: bool,
    pub extra_parameters: ParameterSet,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub components: HashMap<String, String>,
    pub version: String,
    pub counters: MetricsSnapshot,
}
