//! Graph API backed Ad Library client

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use super::client::{AdLibraryClient, ClientError, ClientFactory};
use super::types::{ParameterSet, ResultSet};
use crate::config::AdLibConfig;

const AD_TYPES: &[&str] = &[
    "ALL",
    "POLITICAL_AND_ISSUE_ADS",
    "HOUSING_ADS",
    "EMPLOYMENT_ADS",
    "CREDIT_ADS",
];

/// Query keys the client owns; callers may not set them
const RESERVED_KEYS: &[&str] = &["access_token", "limit"];

const DEFAULT_FIELDS: &str = "id,ad_delivery_start_time,ad_delivery_stop_time,\
ad_creative_bodies,ad_creative_link_captions,ad_creative_link_descriptions,\
ad_creative_link_titles,ad_snapshot_url,page_id,page_name,target_ages,\
target_gender,target_locations,eu_total_reach,age_country_gender_reach_breakdown";

const POLITICAL_FIELDS: &str = "id,ad_creation_time,ad_creative_bodies,\
ad_creative_link_captions,ad_creative_link_descriptions,ad_creative_link_titles,\
ad_delivery_start_time,ad_delivery_stop_time,ad_snapshot_url,bylines,currency,\
delivery_by_region,demographic_distribution,estimated_audience_size,impressions,\
languages,page_id,page_name,publisher_platforms,spend,target_locations,\
target_gender,target_ages,eu_total_reach,beneficiary_payers,\
age_country_gender_reach_breakdown";

/// Creates one [`GraphClient`] per request from shared configuration
#[derive(Debug, Clone)]
pub struct GraphClientFactory {
    config: AdLibConfig,
}

impl GraphClientFactory {
    pub fn new(config: AdLibConfig) -> Self {
        Self { config }
    }
}

impl ClientFactory for GraphClientFactory {
    fn create(
        &self,
        credential: &str,
        project_name: &str,
    ) -> Result<Box<dyn AdLibraryClient>, ClientError> {
        Ok(Box::new(GraphClient::new(
            &self.config,
            credential,
            project_name,
        )?))
    }
}

/// Ad Library client querying `/{version}/ads_archive`
pub struct GraphClient {
    http: Client,
    endpoint: Url,
    credential: String,
    project_name: String,
    page_size: u32,
    max_pages: u32,
    params: ParameterSet,
}

impl GraphClient {
    pub fn new(
        config: &AdLibConfig,
        credential: &str,
        project_name: &str,
    ) -> Result<Self, ClientError> {
        if credential.trim().is_empty() {
            return Err(ClientError::InvalidCredential(
                "access token must not be empty".into(),
            ));
        }

        validate_project_name(project_name)?;

        let endpoint = Url::parse(&format!(
            "{}/{}/ads_archive",
            config.graph_base_url.trim_end_matches('/'),
            config.api_version
        ))
        .map_err(|e| ClientError::Setup(format!("invalid Graph API endpoint: {}", e)))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ClientError::Setup(e.to_string()))?;

        Ok(Self {
            http,
            endpoint,
            credential: credential.to_string(),
            project_name: project_name.to_string(),
            page_size: config.page_size,
            max_pages: config.max_pages,
            params: ParameterSet::new(),
        })
    }

    /// Query string pairs for the first page, credential included
    fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("access_token".to_string(), self.credential.clone()),
            ("limit".to_string(), self.page_size.to_string()),
        ];
        pairs.extend(
            self.params
                .iter()
                .map(|(key, value)| (key.clone(), render_parameter(key, value))),
        );
        pairs
    }

    async fn fetch_page(&self, request: reqwest::RequestBuilder) -> Result<Value, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Request(e.to_string()))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| ClientError::MalformedResponse(e.to_string()))?;

        if let Some(message) = body
            .get("error")
            .and_then(|err| err.get("message"))
            .and_then(Value::as_str)
        {
            return Err(ClientError::Upstream(message.to_string()));
        }

        if !status.is_success() {
            return Err(ClientError::Upstream(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        Ok(body)
    }
}

#[async_trait]
impl AdLibraryClient for GraphClient {
    fn add_parameters(&mut self, params: ParameterSet) -> Result<(), ClientError> {
        if let Some(key) = params.keys().find(|key| RESERVED_KEYS.contains(&key.as_str())) {
            return Err(ClientError::InvalidParameter {
                key: key.clone(),
                reason: "set by the client and cannot be overridden".into(),
            });
        }

        for (key, value) in params {
            if key.trim().is_empty() {
                return Err(ClientError::InvalidParameter {
                    key,
                    reason: "parameter names must not be empty".into(),
                });
            }

            match value {
                Value::Null => {
                    self.params.remove(&key);
                }
                Value::Object(_) => {
                    return Err(ClientError::InvalidParameter {
                        key,
                        reason: "nested objects are not supported".into(),
                    });
                }
                value => {
                    self.params.insert(key, value);
                }
            }
        }

        let ad_type = match self.params.get("ad_type") {
            None => "ALL".to_string(),
            Some(Value::String(ad_type)) if AD_TYPES.contains(&ad_type.as_str()) => {
                ad_type.clone()
            }
            Some(other) => {
                return Err(ClientError::InvalidParameter {
                    key: "ad_type".into(),
                    reason: format!("unsupported ad type {}", other),
                });
            }
        };

        if !self.params.contains_key("fields") {
            let fields = if ad_type == "POLITICAL_AND_ISSUE_ADS" {
                POLITICAL_FIELDS
            } else {
                DEFAULT_FIELDS
            };
            self.params
                .insert("fields".into(), Value::String(fields.to_string()));
        }

        debug!(project = %self.project_name, params = self.params.len(), "Parameters configured");
        Ok(())
    }

    fn parameters(&self) -> ParameterSet {
        self.params.clone()
    }

    async fn fetch(&self) -> Result<Option<ResultSet>, ClientError> {
        info!(project = %self.project_name, endpoint = %self.endpoint, "Querying Ad Library");

        let mut request = self.http.get(self.endpoint.clone()).query(&self.query_pairs());
        let mut rows = ResultSet::default();
        let mut pages = 0;
        let mut saw_data = false;

        loop {
            let body = self.fetch_page(request).await?;
            pages += 1;

            if let Some(data) = body.get("data") {
                saw_data = true;
                let page_rows = data.as_array().ok_or_else(|| {
                    ClientError::MalformedResponse("`data` is not an array".into())
                })?;
                rows.extend(page_rows.iter().filter_map(|row| row.as_object().cloned()));
            }

            let next = body
                .get("paging")
                .and_then(|paging| paging.get("next"))
                .and_then(Value::as_str);

            match next {
                Some(next) if pages < self.max_pages => {
                    debug!(project = %self.project_name, pages, rows = rows.len(), "Following next page");
                    request = self.http.get(next);
                }
                Some(_) => {
                    info!(project = %self.project_name, pages, "Page limit reached, stopping");
                    break;
                }
                None => break,
            }
        }

        info!(project = %self.project_name, pages, rows = rows.len(), "Ad Library query finished");

        if !saw_data {
            return Ok(None);
        }
        Ok(Some(rows))
    }
}

fn validate_project_name(project_name: &str) -> Result<(), ClientError> {
    if project_name.trim().is_empty() {
        return Err(ClientError::InvalidProjectName("must not be empty".into()));
    }

    if project_name.contains(['/', '\\']) || project_name.contains("..") {
        return Err(ClientError::InvalidProjectName(format!(
            "'{}' must not contain path separators",
            project_name
        )));
    }

    Ok(())
}

/// Render a parameter as the Graph API expects it on the query string.
///
/// Lists become JSON arrays; the comma-joined country string is split
/// into an array as well.
fn render_parameter(key: &str, value: &Value) -> String {
    match value {
        Value::String(s) if key == "ad_reached_countries" => {
            let countries: Vec<&str> = s.split(',').map(str::trim).collect();
            Value::from(countries).to_string()
        }
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
