//! Raw API records.
//!
//! A record is a single row from the tabular data API, kept verbatim as an
//! opaque field-to-scalar mapping. The loader interprets exactly two fields:
//! the grouping attribute used for balancing and, in filtered workflows, an
//! identifier column. Everything else passes through untouched to the sink.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Synthetic category assigned to records whose grouping field is missing,
/// null, or empty.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// A single row from the data API.
///
/// No schema is enforced beyond readability of the grouping field; records
/// from the same dataset are expected to share one key set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// The record's category under the grouping attribute `field`.
    ///
    /// Missing, null, and empty-string values all fold into
    /// [`UNKNOWN_CATEGORY`]; those records stay in the run and count
    /// against the synthetic category's quota like any other. Non-string
    /// scalars are rendered to their JSON text form.
    pub fn category(&self, field: &str) -> String {
        match self.0.get(field) {
            None | Some(Value::Null) => UNKNOWN_CATEGORY.to_string(),
            Some(Value::String(s)) if s.is_empty() => UNKNOWN_CATEGORY.to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// The record's identifier under `field`, if present and non-empty.
    ///
    /// Numeric identifiers are rendered to their decimal text form so they
    /// compare equal to identifiers read back from a text column.
    pub fn identifier(&self, field: &str) -> Option<String> {
        match self.0.get(field)? {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// All fields of the record, keyed by column name.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Set a field, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(pairs: &[(&str, Value)]) -> Record {
        let mut r = Record::new();
        for (k, v) in pairs {
            r.insert(*k, v.clone());
        }
        r
    }

    #[test]
    fn test_category_present_string() {
        let r = record(&[("provider_type", json!("Cardiology"))]);
        assert_eq!(r.category("provider_type"), "Cardiology");
    }

    #[test]
    fn test_category_missing_field_is_unknown() {
        let r = record(&[("other", json!("x"))]);
        assert_eq!(r.category("provider_type"), UNKNOWN_CATEGORY);
    }

    #[test]
    fn test_category_null_is_unknown() {
        let r = record(&[("provider_type", Value::Null)]);
        assert_eq!(r.category("provider_type"), UNKNOWN_CATEGORY);
    }

    #[test]
    fn test_category_empty_string_is_unknown() {
        let r = record(&[("provider_type", json!(""))]);
        assert_eq!(r.category("provider_type"), UNKNOWN_CATEGORY);
    }

    #[test]
    fn test_category_numeric_scalar_renders_to_text() {
        let r = record(&[("provider_type", json!(42))]);
        assert_eq!(r.category("provider_type"), "42");
    }

    #[test]
    fn test_identifier_string_and_number_agree() {
        let a = record(&[("npi", json!("1234567890"))]);
        let b = record(&[("npi", json!(1234567890u64))]);
        assert_eq!(a.identifier("npi"), b.identifier("npi"));
    }

    #[test]
    fn test_identifier_absent_or_empty_is_none() {
        let r = record(&[("npi", json!(""))]);
        assert_eq!(r.identifier("npi"), None);
        assert_eq!(r.identifier("missing"), None);
    }

    #[test]
    fn test_record_roundtrips_transparently() {
        let r = record(&[("a", json!("1")), ("b", json!(2))]);
        let encoded = serde_json::to_string(&r).unwrap();
        assert_eq!(encoded, r#"{"a":"1","b":2}"#);
        let decoded: Record = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, r);
    }
}
