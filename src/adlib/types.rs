use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field carrying the rendered creative link for an ad.
pub const SNAPSHOT_URL_FIELD: &str = "ad_snapshot_url";

/// Field carrying the Ad Library id of a row.
pub const ID_FIELD: &str = "id";

/// One ad record as returned by the metadata client. Only `id` and
/// `ad_snapshot_url` are inspected; everything else passes through.
pub type ResultRow = Map<String, Value>;

/// Parameter map handed to a metadata client.
pub type ParameterSet = Map<String, Value>;

/// Ordered collection of ad records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    rows: Vec<ResultRow>,
}

impl ResultSet {
    pub fn new(rows: Vec<ResultRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [ResultRow] {
        &mut self.rows
    }

    pub fn into_rows(self) -> Vec<ResultRow> {
        self.rows
    }

    /// True when any row carries `column`, mirroring a tabular column that
    /// exists as soon as one record has it.
    pub fn has_column(&self, column: &str) -> bool {
        self.rows.iter().any(|row| row.contains_key(column))
    }

    pub fn extend(&mut self, rows: impl IntoIterator<Item = ResultRow>) {
        self.rows.extend(rows);
    }
}

impl From<Vec<ResultRow>> for ResultSet {
    fn from(rows: Vec<ResultRow>) -> Self {
        Self::new(rows)
    }
}

/// Row id coerced to a string. Numbers use their decimal form.
pub fn row_id(row: &ResultRow) -> Option<String> {
    match row.get(ID_FIELD)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> ResultRow {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_has_column_checks_any_row() {
        let set = ResultSet::new(vec![
            row(json!({"id": "1"})),
            row(json!({"id": "2", "ad_snapshot_url": "https://x"})),
        ]);

        assert!(set.has_column(SNAPSHOT_URL_FIELD));
        assert!(!set.has_column("page_name"));
    }

    #[test]
    fn test_row_id_coerces_numbers() {
        assert_eq!(row_id(&row(json!({"id": 7}))), Some("7".to_string()));
        assert_eq!(row_id(&row(json!({"id": "8"}))), Some("8".to_string()));
        assert_eq!(row_id(&row(json!({"id": null}))), None);
        assert_eq!(row_id(&row(json!({}))), None);
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let set = ResultSet::new(vec![row(json!({"id": "1"}))]);
        assert_eq!(serde_json::to_value(&set).unwrap(), json!([{"id": "1"}]));
    }
}
