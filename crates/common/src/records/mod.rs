//! Brand records and their mapping to spreadsheet rows
//!
//! Provides:
//! - The canonical [`Record`] exchanged with dashboard clients
//! - The column whitelist and alias table
//! - Pure row <-> record translation

pub mod columns;
mod mapper;

pub use mapper::{
    is_placeholder, record_to_row, resolve_alias, row_to_record, string_to_tags, tags_to_string,
};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One brand case-study entry.
///
/// Field names on the wire follow the sheet's historical headers, so the
/// JSON shape is what the dashboard has always exchanged. Every scalar is
/// a string because the sheet has no types; missing values deserialize to
/// empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    /// Natural key. Opaque, compared loosely, uniqueness not enforced.
    #[serde(rename = "s_no", deserialize_with = "loose_string")]
    pub serial: String,

    #[serde(deserialize_with = "loose_string")]
    pub brand_name: String,

    #[serde(deserialize_with = "loose_string")]
    pub brand_logo: String,

    #[serde(deserialize_with = "loose_string")]
    pub slug: String,

    #[serde(rename = "Founder_name", deserialize_with = "loose_string")]
    pub founder_name: String,

    #[serde(rename = "Founder_image", deserialize_with = "loose_string")]
    pub founder_image: String,

    #[serde(rename = "OLD_MRR", deserialize_with = "loose_string")]
    pub old_mrr: String,

    #[serde(deserialize_with = "loose_string")]
    pub timeline: String,

    #[serde(rename = "New_MRR", deserialize_with = "loose_string")]
    pub new_mrr: String,

    #[serde(rename = "Cover_Image_link", deserialize_with = "loose_string")]
    pub cover_image: String,

    #[serde(rename = "Cover_text", deserialize_with = "loose_string")]
    pub cover_text: String,

    /// HTML fragment from the rich-text editor, stored and served as-is
    #[serde(deserialize_with = "loose_string")]
    pub body_text: String,

    #[serde(rename = "Custom_CTA", deserialize_with = "loose_string")]
    pub custom_cta: String,

    #[serde(rename = "SEO_meta_data", deserialize_with = "loose_string")]
    pub seo_meta: String,

    #[serde(rename = "Category_tags", deserialize_with = "loose_string")]
    pub category_tags: String,

    /// Accepts either a JSON array or a comma-joined string
    #[serde(rename = "tag", deserialize_with = "loose_tags")]
    pub tags: Vec<String>,

    /// Sheet row the record was read from. Only valid for the read that
    /// produced it and never written back.
    #[serde(rename = "rowIndex", skip_serializing_if = "Option::is_none")]
    pub row_index: Option<u32>,
}

impl Record {
    /// Empty draft carrying only a serial, as used for new entries and deletes
    pub fn with_serial(serial: impl Into<String>) -> Self {
        Self {
            serial: serial.into(),
            ..Self::default()
        }
    }

    /// Whether this record is identified by `serial`
    pub fn has_serial(&self, serial: &str) -> bool {
        serial_matches(&self.serial, serial)
    }
}

/// Loose serial comparison.
///
/// Serials are compared as trimmed strings; two numeric-looking serials
/// are also equal when they denote the same number (`"1"` and `"1.0"`).
pub fn serial_matches(stored: &str, wanted: &str) -> bool {
    let (stored, wanted) = (stored.trim(), wanted.trim());
    if stored == wanted {
        return true;
    }
    match (stored.parse::<f64>(), wanted.parse::<f64>()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn scalar_to_string(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn loose_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_to_string(Value::deserialize(deserializer)?))
}

fn loose_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        // empty entries survive either form, as they do in the stored cell
        Value::Array(items) => items.into_iter().map(scalar_to_string).collect(),
        Value::Null => Vec::new(),
        Value::String(joined) => string_to_tags(Some(&joined)),
        other => string_to_tags(Some(&scalar_to_string(other))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serial_loose_equality() {
        assert!(serial_matches("1", "1"));
        assert!(serial_matches(" 7 ", "7"));
        assert!(serial_matches("1", "1.0"));
        assert!(!serial_matches("1", "2"));
        assert!(!serial_matches("abc", "ABC"));
        assert!(!serial_matches("", "0"));
    }

    #[test]
    fn test_deserialize_numeric_serial_and_missing_fields() {
        let record: Record = serde_json::from_value(json!({
            "s_no": 12,
            "brand_name": "Acme",
            "New_MRR": 4500,
            "Founder_name": null
        }))
        .unwrap();

        assert_eq!(record.serial, "12");
        assert_eq!(record.new_mrr, "4500");
        assert_eq!(record.founder_name, "");
        assert_eq!(record.slug, "");
        assert!(record.tags.is_empty());
        assert_eq!(record.row_index, None);
    }

    #[test]
    fn test_tags_accept_array_or_string() {
        let from_array: Record = serde_json::from_value(json!({ "tag": ["saas", "b2b"] })).unwrap();
        let from_string: Record = serde_json::from_value(json!({ "tag": "saas,b2b" })).unwrap();
        let from_empty: Record = serde_json::from_value(json!({ "tag": "" })).unwrap();

        assert_eq!(from_array.tags, vec!["saas", "b2b"]);
        assert_eq!(from_string.tags, from_array.tags);
        assert!(from_empty.tags.is_empty());
    }

    #[test]
    fn test_empty_tags_treated_alike_in_both_forms() {
        let from_array: Record = serde_json::from_value(json!({ "tag": ["a", "", "b"] })).unwrap();
        let from_string: Record = serde_json::from_value(json!({ "tag": "a,,b" })).unwrap();

        assert_eq!(from_array.tags, vec!["a", "", "b"]);
        assert_eq!(from_string.tags, from_array.tags);
        assert_eq!(tags_to_string(&from_array.tags), "a,,b");
    }

    #[test]
    fn test_serialize_uses_sheet_field_names() {
        let mut record = Record::with_serial("3");
        record.cover_text = "Hero".into();
        record.tags = vec!["a".into()];
        record.row_index = Some(5);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["s_no"], "3");
        assert_eq!(json["Cover_text"], "Hero");
        assert_eq!(json["tag"], json!(["a"]));
        assert_eq!(json["rowIndex"], 5);
        assert!(json.get("serial").is_none());
    }

    #[test]
    fn test_row_index_omitted_when_unknown() {
        let json = serde_json::to_value(Record::with_serial("1")).unwrap();
        assert!(json.get("rowIndex").is_none());
    }
}
