//! Snapshot URL token refresh
//!
//! Snapshot URLs returned by the Ad Library embed the token that ran the
//! query. Media downloads must present the caller's current credential, so
//! the `access_token` query parameter is rewritten before rows leave the
//! metadata stage.

use reqwest::Url;
use serde_json::Value;
use tracing::warn;

use super::types::{ResultSet, SNAPSHOT_URL_FIELD};

const TOKEN_PARAM: &str = "access_token";

/// Rewrite the token in every row's snapshot URL.
///
/// Returns the number of rows whose URL changed.
pub fn refresh_snapshot_tokens(rows: &mut ResultSet, credential: &str) -> usize {
    let mut refreshed = 0;

    for row in rows.rows_mut() {
        let Some(Value::String(url)) = row.get_mut(SNAPSHOT_URL_FIELD) else {
            continue;
        };

        match replace_access_token(url, credential) {
            Some(updated) => {
                if *url != updated {
                    *url = updated;
                    refreshed += 1;
                }
            }
            None => warn!(url = %url, "Snapshot URL left unchanged"),
        }
    }

    refreshed
}

/// Replace the `access_token` query value in `url`.
///
/// Returns `None` when the URL does not parse or carries no token.
pub fn replace_access_token(url: &str, token: &str) -> Option<String> {
    let mut parsed = Url::parse(url).ok()?;

    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(key, value)| {
            let value = if key == TOKEN_PARAM {
                token.to_string()
            } else {
                value.into_owned()
            };
            (key.into_owned(), value)
        })
        .collect();

    if !pairs.iter().any(|(key, _)| key == TOKEN_PARAM) {
        return None;
    }

    parsed.query_pairs_mut().clear().extend_pairs(&pairs);
    Some(parsed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_replace_access_token() {
        let url = "https://www.facebook.com/ads/archive/render_ad/?id=123&access_token=old";
        let updated = replace_access_token(url, "fresh").unwrap();

        assert_eq!(
            updated,
            "https://www.facebook.com/ads/archive/render_ad/?id=123&access_token=fresh"
        );
    }

    #[test]
    fn test_replace_access_token_without_token_param() {
        assert!(replace_access_token("https://example.com/?id=1", "t").is_none());
        assert!(replace_access_token("not a url", "t").is_none());
    }

    #[test]
    fn test_refresh_counts_changed_rows() {
        let mut rows = ResultSet::new(vec![
            json!({"id": "1", "ad_snapshot_url": "https://x.test/?id=1&access_token=old"})
                .as_object()
                .cloned()
                .unwrap(),
            json!({"id": "2", "ad_snapshot_url": "https://x.test/?id=2&access_token=new"})
                .as_object()
                .cloned()
                .unwrap(),
            json!({"id": "3"}).as_object().cloned().unwrap(),
        ]);

        let refreshed = refresh_snapshot_tokens(&mut rows, "new");

        assert_eq!(refreshed, 1);
        assert_eq!(
            rows.rows()[0][SNAPSHOT_URL_FIELD],
            json!("https://x.test/?id=1&access_token=new")
        );
        assert!(!rows.rows()[2].contains_key(SNAPSHOT_URL_FIELD));
    }
}
