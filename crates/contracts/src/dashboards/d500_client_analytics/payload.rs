use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One result row as returned by the API (column name → value)
pub type Record = serde_json::Map<String, Value>;

/// `data` of a response: a row list for most analyses, an object keyed by group for a few
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PayloadData {
    Rows(Vec<Record>),
    Keyed(Record),
}

/// Success body of any analysis endpoint.
///
/// Only existence is checked: a missing `data` means "no results", not an error. Analysis
/// specific aggregates (`total_equipments`, `by_status`, `datasets`, ...) land in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisPayload {
    #[serde(default)]
    pub data: Option<PayloadData>,
    #[serde(default)]
    pub total_rows: Option<u64>,
    #[serde(default)]
    pub cities: Option<Vec<String>>,
    #[serde(default)]
    pub charts: Option<BTreeMap<String, Vec<Record>>>,
    #[serde(flatten)]
    pub extra: Record,
}

impl AnalysisPayload {
    pub fn rows(&self) -> &[Record] {
        match &self.data {
            Some(PayloadData::Rows(rows)) => rows,
            _ => &[],
        }
    }

    /// `data` given as an object, e.g. one entry per city
    pub fn keyed(&self) -> Option<&Record> {
        match &self.data {
            Some(PayloadData::Keyed(groups)) => Some(groups),
            _ => None,
        }
    }

    /// Server total, falling back to the rows on this page
    pub fn total_rows(&self) -> u64 {
        self.total_rows.unwrap_or(self.rows().len() as u64)
    }

    pub fn cities(&self) -> &[String] {
        self.cities.as_deref().unwrap_or(&[])
    }

    /// Record list stored under `key`, looked up in `charts` first and then at top level
    pub fn records(&self, key: &str) -> Vec<&Record> {
        if let Some(list) = self.charts.as_ref().and_then(|c| c.get(key)) {
            return list.iter().collect();
        }
        match self.extra.get(key) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_object).collect(),
            _ => Vec::new(),
        }
    }

    /// Top-level numeric aggregate, 0 when absent
    pub fn number(&self, key: &str) -> f64 {
        self.extra.get(key).map(value_as_f64).unwrap_or(0.0)
    }

    /// Top-level object such as `totals` or `info`
    pub fn object(&self, key: &str) -> Option<&Record> {
        self.extra.get(key).and_then(Value::as_object)
    }

    /// Top-level list of strings; other items are skipped
    pub fn texts(&self, key: &str) -> Vec<String> {
        match self.extra.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter(|v| !v.is_null())
                .map(value_as_text)
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty() && self.keyed().map_or(true, |groups| groups.is_empty())
    }
}

/// Numeric view of a JSON cell; numeric strings are accepted, anything else is 0
pub fn value_as_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

/// Text view of a JSON cell, empty for null
pub fn value_as_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Error body of a non-2xx response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorBody {
    /// `error` wins over `message`; blank strings count as absent
    pub fn into_message(self) -> Option<String> {
        self.error
            .filter(|s| !s.trim().is_empty())
            .or(self.message.filter(|s| !s.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_keeps_extra_aggregates() {
        let payload: AnalysisPayload = serde_json::from_str(
            r#"{"data":[{"Cidade":"X","Total":7}],"total_rows":1,"total_equipments":"42",
                "by_status":[{"Status":"Ativo","Count":3}]}"#,
        )
        .unwrap();

        assert_eq!(payload.rows().len(), 1);
        assert_eq!(payload.total_rows(), 1);
        assert_eq!(payload.number("total_equipments"), 42.0);
        assert_eq!(payload.records("by_status").len(), 1);
        assert!(payload.records("missing").is_empty());
    }

    #[test]
    fn test_missing_data_is_empty_not_error() {
        let payload: AnalysisPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.is_empty());
        assert_eq!(payload.total_rows(), 0);
    }

    #[test]
    fn test_data_keyed_by_city() {
        let payload: AnalysisPayload = serde_json::from_str(
            r#"{"data":{"X":{"daily_data":[],"totals":{"total_churn":2}}},
                "totals":{"total_interest_amount":"10.5"},"labels":["2024-01",null,"2024-02"]}"#,
        )
        .unwrap();

        assert!(payload.rows().is_empty());
        assert!(!payload.is_empty());
        assert!(payload.keyed().unwrap().contains_key("X"));
        let totals = payload.object("totals").unwrap();
        assert_eq!(value_as_f64(&totals["total_interest_amount"]), 10.5);
        assert_eq!(payload.texts("labels"), vec!["2024-01", "2024-02"]);
    }

    #[test]
    fn test_error_body_prefers_error_field() {
        let body = ApiErrorBody {
            error: Some("boom".into()),
            message: Some("other".into()),
        };
        assert_eq!(body.into_message().as_deref(), Some("boom"));
        assert_eq!(ApiErrorBody::default().into_message(), None);
    }
}
