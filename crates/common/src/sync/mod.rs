//! Sync service
//!
//! The request-handling core behind `GET /sync` and `POST /sync`:
//! resolves the target sheet, runs rows through the record mapper and
//! dispatches writes to the spreadsheet gateway. Writes are not
//! transactional and nothing here retries; callers reconcile by reading
//! again.

mod wire;

pub use wire::{ReadQuery, SheetSnapshot, WriteAck, WriteAction, WriteRequest};

use crate::errors::{AppError, Result};
use crate::metrics;
use crate::records::{is_placeholder, record_to_row, row_to_record};
use crate::sheets::SharedStore;
use tracing::{info, instrument};

/// Result of a write the backing store accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Row appended, overwritten or removed
    Applied,
    /// Update/delete found no row with that serial; nothing changed
    NoMatch,
}

/// Read and write entry points over the shared store
#[derive(Clone)]
pub struct SyncService {
    store: SharedStore,
    default_sheet: String,
}

impl SyncService {
    pub fn new(store: SharedStore, default_sheet: impl Into<String>) -> Self {
        Self {
            store,
            default_sheet: default_sheet.into(),
        }
    }

    /// Every sheet title, in spreadsheet order
    pub async fn sheets(&self) -> Result<Vec<String>> {
        self.store.get().await?.list_sheets().await
    }

    /// Records of `sheet` (the first sheet when not given) with the full
    /// title list. Rows with a blank brand name are left out.
    #[instrument(skip(self))]
    pub async fn read(&self, sheet: Option<&str>) -> Result<SheetSnapshot> {
        let store = self.store.get().await?;
        let sheets = store.list_sheets().await?;

        let title = match sheet.map(str::trim).filter(|s| !s.is_empty()) {
            Some(explicit) => explicit.to_string(),
            None => sheets.first().cloned().ok_or_else(|| AppError::SheetNotFound {
                title: self.default_sheet.clone(),
            })?,
        };

        let data: Vec<_> = store
            .list_rows(&title)
            .await?
            .iter()
            .filter(|row| !is_placeholder(&row.values))
            .map(row_to_record)
            .collect();

        metrics::record_read(&title, data.len());
        Ok(SheetSnapshot {
            sheet: title,
            sheets,
            data,
        })
    }

    /// Apply one create, update or delete.
    ///
    /// Updates overwrite every mapped column, so a field the caller left
    /// out is stored empty.
    #[instrument(skip(self, request), fields(action = %request.action))]
    pub async fn write(&self, request: WriteRequest) -> Result<WriteOutcome> {
        let sheet = request
            .sheet_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.default_sheet)
            .to_string();
        let action = request.action;

        let result = self.dispatch(&sheet, request).await;
        let outcome_label = match &result {
            Ok(WriteOutcome::Applied) => "applied",
            Ok(WriteOutcome::NoMatch) => "no_match",
            Err(_) => "error",
        };
        metrics::record_write(action.as_str(), outcome_label);

        if let Ok(outcome) = &result {
            info!(sheet = %sheet, ?outcome, "Write processed");
        }
        result
    }

    async fn dispatch(&self, sheet: &str, request: WriteRequest) -> Result<WriteOutcome> {
        let record = request.data;

        // a blank serial would match the first row whose serial cell is blank
        if request.action != WriteAction::Create && record.serial.trim().is_empty() {
            return Err(AppError::Validation {
                message: format!("{} requires a serial number", request.action),
                field: Some("s_no".to_string()),
            });
        }

        let store = self.store.get().await?;

        let applied = match request.action {
            WriteAction::Create => {
                store.append_row(sheet, &record_to_row(&record)).await?;
                true
            }
            WriteAction::Update => {
                store
                    .overwrite_row(sheet, &record.serial, &record_to_row(&record))
                    .await?
            }
            WriteAction::Delete => store.delete_row(sheet, &record.serial).await?,
        };

        Ok(if applied {
            WriteOutcome::Applied
        } else {
            WriteOutcome::NoMatch
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{columns, Record};
    use crate::sheets::{MemorySheetStore, SheetStore};
    use std::sync::Arc;

    const HEADERS: &[&str] = &[
        "s_no",
        "brand_name",
        "slug",
        "Founder_name",
        "Cover_text_1",
        "Cover_text",
        "body_text_1",
        "body_text",
        "tag",
    ];

    fn fixture() -> (SyncService, Arc<MemorySheetStore>) {
        let store = Arc::new(
            MemorySheetStore::new(2)
                .with_sheet(
                    "Brands",
                    HEADERS,
                    vec![
                        vec!["1", "Acme", "acme", "Jo", "", "Legacy cover", "<p>new</p>", "<p>old</p>", "a,b"],
                        vec!["2", "", "", "", "", "", "", "", ""],
                        vec!["3", "   ", "", "", "", "", "", "", ""],
                    ],
                )
                .with_sheet("Archive", HEADERS, vec![vec!["9", "Old Co"]]),
        );
        let service = SyncService::new(SharedStore::ready(store.clone()), "Brands");
        (service, store)
    }

    #[tokio::test]
    async fn test_read_defaults_to_first_sheet_and_filters_placeholders() {
        let (service, _) = fixture();
        let snapshot = service.read(None).await.unwrap();

        assert_eq!(snapshot.sheet, "Brands");
        assert_eq!(snapshot.sheets, vec!["Brands", "Archive"]);
        assert_eq!(snapshot.data.len(), 1);

        let acme = &snapshot.data[0];
        assert_eq!(acme.brand_name, "Acme");
        assert_eq!(acme.cover_text, "Legacy cover");
        assert_eq!(acme.body_text, "<p>new</p>");
        assert_eq!(acme.tags, vec!["a", "b"]);
        assert_eq!(acme.row_index, Some(3));
    }

    #[tokio::test]
    async fn test_read_explicit_sheet() {
        let (service, _) = fixture();
        let snapshot = service.read(Some("Archive")).await.unwrap();
        assert_eq!(snapshot.sheet, "Archive");
        assert_eq!(snapshot.sheets.len(), 2);
        assert_eq!(snapshot.data[0].brand_name, "Old Co");
    }

    #[tokio::test]
    async fn test_read_unknown_sheet_names_it() {
        let (service, _) = fixture();
        let err = service.read(Some("Nonexistent")).await.unwrap_err();
        assert!(matches!(err, AppError::SheetNotFound { .. }));
        assert!(err.to_string().contains("Nonexistent"));
    }

    #[tokio::test]
    async fn test_read_empty_spreadsheet() {
        let service = SyncService::new(SharedStore::ready(Arc::new(MemorySheetStore::new(2))), "Sheet1");
        let err = service.read(None).await.unwrap_err();
        assert!(matches!(err, AppError::SheetNotFound { ref title } if title == "Sheet1"));
    }

    #[tokio::test]
    async fn test_create_appends_canonical_columns() {
        let (service, store) = fixture();
        let mut record = Record::with_serial("4");
        record.brand_name = "Beta".into();
        record.cover_text = "Fresh".into();

        let outcome = service
            .write(WriteRequest::create("Brands", record))
            .await
            .unwrap();
        assert_eq!(outcome, WriteOutcome::Applied);

        let rows = store.list_rows("Brands").await.unwrap();
        let appended = rows.last().unwrap();
        assert_eq!(appended.get(columns::COVER_TEXT), "Fresh");
        assert_eq!(appended.get(columns::COVER_TEXT_LEGACY), "");
    }

    #[tokio::test]
    async fn test_update_is_full_overwrite() {
        let (service, store) = fixture();
        let mut record = Record::with_serial("1");
        record.brand_name = "Acme Inc".into();

        let outcome = service.write(WriteRequest::update("Brands", record)).await.unwrap();
        assert_eq!(outcome, WriteOutcome::Applied);

        let rows = store.list_rows("Brands").await.unwrap();
        assert_eq!(rows[0].get("brand_name"), "Acme Inc");
        assert_eq!(rows[0].get("Founder_name"), "");
        assert_eq!(rows[0].get("slug"), "");
        // legacy column is never written
        assert_eq!(rows[0].get("Cover_text"), "Legacy cover");
    }

    #[tokio::test]
    async fn test_update_unknown_serial_is_no_match() {
        let (service, _) = fixture();
        let outcome = service
            .write(WriteRequest::update("Brands", Record::with_serial("77")))
            .await
            .unwrap();
        assert_eq!(outcome, WriteOutcome::NoMatch);
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let (service, _) = fixture();
        let first = service.write(WriteRequest::delete("Brands", "1")).await.unwrap();
        let second = service.write(WriteRequest::delete("Brands", "1")).await.unwrap();
        assert_eq!(first, WriteOutcome::Applied);
        assert_eq!(second, WriteOutcome::NoMatch);
    }

    #[tokio::test]
    async fn test_write_without_sheet_uses_default() {
        let (service, store) = fixture();
        let request = WriteRequest {
            sheet_name: Some("  ".into()),
            data: Record::with_serial("1"),
            action: WriteAction::Delete,
        };
        assert_eq!(service.write(request).await.unwrap(), WriteOutcome::Applied);
        assert!(store.find_one("Brands", "s_no", "1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_to_unknown_sheet_fails() {
        let (service, _) = fixture();
        let err = service
            .write(WriteRequest::create("Missing", Record::with_serial("1")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SheetNotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_or_delete_without_serial_is_rejected() {
        let (service, store) = fixture();

        for request in [
            WriteRequest::delete("Brands", ""),
            WriteRequest::delete("Brands", "  "),
            WriteRequest::update("Brands", Record::default()),
        ] {
            let err = service.write(request).await.unwrap_err();
            assert!(matches!(err, AppError::Validation { ref field, .. } if field.as_deref() == Some("s_no")));
            assert!(err.is_caller_fault());
        }

        // nothing was removed or overwritten
        let rows = store.list_rows("Brands").await.unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[tokio::test]
    async fn test_create_without_serial_is_allowed() {
        let (service, store) = fixture();
        let mut record = Record::default();
        record.brand_name = "Unnumbered".into();

        let outcome = service.write(WriteRequest::create("Brands", record)).await.unwrap();
        assert_eq!(outcome, WriteOutcome::Applied);
        assert_eq!(store.list_rows("Brands").await.unwrap().len(), 4);
    }
}
