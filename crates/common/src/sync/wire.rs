//! JSON bodies of the sync endpoints

use crate::records::Record;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Response of a read: one sheet's records plus every sheet title
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetSnapshot {
    /// Sheet the records came from
    pub sheet: String,
    /// All sheet titles, for the selector
    pub sheets: Vec<String>,
    pub data: Vec<Record>,
}

/// Query of a read
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReadQuery {
    pub sheet: Option<String>,
}

/// What a write does with its record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WriteAction {
    Create,
    Update,
    Delete,
}

impl WriteAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteAction::Create => "CREATE",
            WriteAction::Update => "UPDATE",
            WriteAction::Delete => "DELETE",
        }
    }
}

impl fmt::Display for WriteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteRequest {
    /// Target sheet; the configured default when absent or empty
    #[serde(rename = "sheetName", default, skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,
    /// The full record for create/update; only the serial matters for delete
    #[serde(default)]
    pub data: Record,
    pub action: WriteAction,
}

impl WriteRequest {
    pub fn create(sheet: &str, record: Record) -> Self {
        Self {
            sheet_name: Some(sheet.to_string()),
            data: record,
            action: WriteAction::Create,
        }
    }

    pub fn update(sheet: &str, record: Record) -> Self {
        Self {
            sheet_name: Some(sheet.to_string()),
            data: record,
            action: WriteAction::Update,
        }
    }

    pub fn delete(sheet: &str, serial: &str) -> Self {
        Self {
            sheet_name: Some(sheet.to_string()),
            data: Record::with_serial(serial),
            action: WriteAction::Delete,
        }
    }
}

/// Response of an accepted write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteAck {
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_request_from_dashboard_body() {
        let request: WriteRequest = serde_json::from_value(json!({
            "sheetName": "Q3",
            "data": { "s_no": "4", "brand_name": "Acme", "tag": "a,b" },
            "action": "UPDATE"
        }))
        .unwrap();

        assert_eq!(request.sheet_name.as_deref(), Some("Q3"));
        assert_eq!(request.action, WriteAction::Update);
        assert_eq!(request.data.serial, "4");
        assert_eq!(request.data.tags, vec!["a", "b"]);
    }

    #[test]
    fn test_delete_body_needs_only_serial() {
        let request: WriteRequest = serde_json::from_value(json!({
            "data": { "s_no": 2 },
            "action": "DELETE"
        }))
        .unwrap();

        assert_eq!(request.sheet_name, None);
        assert_eq!(request.data.serial, "2");
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let result = serde_json::from_value::<WriteRequest>(json!({
            "data": {},
            "action": "UPSERT"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_delete_constructor_serializes_like_dashboard() {
        let json = serde_json::to_value(WriteRequest::delete("Sheet1", "5")).unwrap();
        assert_eq!(json["sheetName"], "Sheet1");
        assert_eq!(json["action"], "DELETE");
        assert_eq!(json["data"]["s_no"], "5");
    }
}
