//! Request parameter normalization
//!
//! Pure transforms from loosely shaped request values into the canonical
//! parameter set handed to the Ad Library client. Nothing here performs
//! I/O or reads the clock; callers pass "now" in.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::adlib::ParameterSet;
use crate::api::models::ValidatedRequest;
use crate::config::AdLibConfig;

/// Calendar date format expected by the Ad Library
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Sortable, second-resolution format for derived project names
pub const PROJECT_NAME_FORMAT: &str = "%Y%m%d%H%M%S";

/// Fallbacks applied when a request leaves a value out
#[derive(Debug, Clone, PartialEq)]
pub struct Defaults {
    pub country: String,
    pub start_date: NaiveDate,
}

impl From<&AdLibConfig> for Defaults {
    fn from(config: &AdLibConfig) -> Self {
        Self {
            country: config.default_country.clone(),
            start_date: config.default_start_date,
        }
    }
}

/// Delivery date bounds, formatted as `YYYY-MM-DD`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateBounds {
    pub min: String,
    pub max: String,
}

/// Upper-case, trim, drop empties and duplicates (first occurrence wins),
/// then comma-join. Falls back to `default` when nothing is left.
pub fn normalize_countries<S: AsRef<str>>(countries: Option<&[S]>, default: &str) -> String {
    let Some(countries) = countries else {
        return default.to_string();
    };

    let mut seen: Vec<String> = Vec::new();
    for country in countries {
        let code = country.as_ref().trim().to_uppercase();
        if !code.is_empty() && !seen.contains(&code) {
            seen.push(code);
        }
    }

    if seen.is_empty() {
        return default.to_string();
    }
    seen.join(",")
}

/// Trim entries and drop empty ones. An empty result is `None`, never an
/// empty list.
pub fn normalize_identifier_list<S: AsRef<str>>(values: Option<&[S]>) -> Option<Vec<String>> {
    let processed: Vec<String> = values?
        .iter()
        .map(|value| value.as_ref().trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect();

    if processed.is_empty() {
        None
    } else {
        Some(processed)
    }
}

/// Resolve delivery date bounds; a missing `min` uses the configured
/// start, a missing `max` uses `today`.
pub fn date_bounds(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    default_start: NaiveDate,
    today: NaiveDate,
) -> DateBounds {
    DateBounds {
        min: start.unwrap_or(default_start).format(DATE_FORMAT).to_string(),
        max: end.unwrap_or(today).format(DATE_FORMAT).to_string(),
    }
}

/// Project name derived from a timestamp
pub fn derive_project_name(now: DateTime<Utc>) -> String {
    now.format(PROJECT_NAME_FORMAT).to_string()
}

/// Assemble the client parameter set for a validated request.
///
/// Absent optional values are left out. `extra_parameters` are merged
/// last, so a colliding key overrides the computed value.
pub fn build_parameters(
    request: &ValidatedRequest,
    defaults: &Defaults,
    today: NaiveDate,
) -> ParameterSet {
    let bounds = date_bounds(request.date_start, request.date_end, defaults.start_date, today);
    let countries = normalize_countries(request.countries.as_deref(), &defaults.country);

    let mut params = ParameterSet::new();

    if let Some(fields) = &request.fields {
        params.insert("fields".into(), Value::String(fields.clone()));
    }
    params.insert("ad_reached_countries".into(), Value::String(countries));
    params.insert("ad_delivery_date_min".into(), Value::String(bounds.min));
    params.insert("ad_delivery_date_max".into(), Value::String(bounds.max));
    if let Some(page_ids) = normalize_identifier_list(request.page_ids.as_deref()) {
        params.insert("search_page_ids".into(), Value::from(page_ids));
    }
    if let Some(terms) = normalize_identifier_list(request.search_terms.as_deref()) {
        params.insert("search_terms".into(), Value::from(terms));
    }
    params.insert("ad_type".into(), Value::String(request.ad_type.clone()));

    for (key, value) in &request.extra_parameters {
        params.insert(key.clone(), value.clone());
    }

    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn defaults() -> Defaults {
        Defaults {
            country: "NL".into(),
            start_date: date(2023, 1, 1),
        }
    }

    fn request() -> ValidatedRequest {
        ValidatedRequest {
            credential: "token".into(),
            project_name: None,
            countries: None,
            date_start: None,
            date_end: None,
            page_ids: Some(vec!["123".into()]),
            search_terms: None,
            ad_type: "ALL".into(),
            fields: None,
            media_limit: None,
            media_ad_ids: None,
            random_sample_media: true,
            extra_parameters: ParameterSet::new(),
        }
    }

    #[test]
    fn test_normalize_countries_dedupes_and_uppercases() {
        assert_eq!(normalize_countries(Some(&["nl", "NL", " be "]), "XX"), "NL,BE");
    }

    #[test]
    fn test_normalize_countries_single_value() {
        assert_eq!(normalize_countries(Some(&["fr"]), "NL"), "FR");
    }

    #[test]
    fn test_normalize_countries_defaults() {
        assert_eq!(normalize_countries::<&str>(None, "NL"), "NL");
        assert_eq!(normalize_countries(Some(&["", "  "]), "NL"), "NL");
    }

    #[test]
    fn test_normalize_identifier_list() {
        assert_eq!(
            normalize_identifier_list(Some(&["", " a ", "b"])),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(normalize_identifier_list(Some(&[""])), None);
        assert_eq!(normalize_identifier_list::<String>(None), None);
    }

    #[test]
    fn test_date_bounds() {
        let today = date(2024, 6, 30);

        assert_eq!(
            date_bounds(Some(date(2024, 1, 2)), Some(date(2024, 2, 3)), date(2023, 1, 1), today),
            DateBounds {
                min: "2024-01-02".into(),
                max: "2024-02-03".into()
            }
        );
        assert_eq!(
            date_bounds(None, None, date(2023, 1, 1), today),
            DateBounds {
                min: "2023-01-01".into(),
                max: "2024-06-30".into()
            }
        );
    }

    #[test]
    fn test_derive_project_name_format() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 8, 7).unwrap();
        assert_eq!(derive_project_name(now), "20240501090807");
    }

    #[test]
    fn test_build_parameters_defaults() {
        let params = build_parameters(&request(), &defaults(), date(2024, 6, 30));

        assert_eq!(
            Value::Object(params),
            json!({
                "ad_reached_countries": "NL",
                "ad_delivery_date_min": "2023-01-01",
                "ad_delivery_date_max": "2024-06-30",
                "search_page_ids": ["123"],
                "ad_type": "ALL",
            })
        );
    }

    #[test]
    fn test_build_parameters_extra_overrides_computed_keys() {
        let mut req = request();
        req.fields = Some("id,page_name".into());
        req.search_terms = Some(vec!["shoes".into()]);
        req.extra_parameters = json!({"ad_type": "POLITICAL_AND_ISSUE_ADS", "languages": ["nl"]})
            .as_object()
            .cloned()
            .unwrap();

        let params = build_parameters(&req, &defaults(), date(2024, 6, 30));

        assert_eq!(params["ad_type"], json!("POLITICAL_AND_ISSUE_ADS"));
        assert_eq!(params["languages"], json!(["nl"]));
        assert_eq!(params["fields"], json!("id,page_name"));
        assert_eq!(params["search_terms"], json!(["shoes"]));
    }
}
