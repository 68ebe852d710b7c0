//! Spreadsheet gateway
//!
//! The only code that talks to the backing spreadsheet. Provides:
//! - The [`SheetStore`] trait (sheet enumeration and row CRUD by serial)
//! - A Google Sheets API implementation
//! - An in-process implementation for local runs and tests
//! - The process-wide lazily initialized store handle

pub mod google;
mod memory;
mod shared;

pub use google::GoogleSheetsStore;
pub use memory::MemorySheetStore;
pub use shared::{SharedStore, StoreFactory};

use crate::errors::Result;
use crate::records::{columns, serial_matches};
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Header -> cell text for one row
pub type RowValues = BTreeMap<String, String>;

/// A data row as read from a sheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based sheet row number at read time. Shifts whenever rows above
    /// it are inserted or deleted.
    pub row_index: Option<u32>,
    pub values: RowValues,
}

impl RawRow {
    pub fn new(values: RowValues) -> Self {
        Self {
            row_index: None,
            values,
        }
    }

    pub fn at(row_index: u32, values: RowValues) -> Self {
        Self {
            row_index: Some(row_index),
            values,
        }
    }

    /// Cell text, empty when the column is absent
    pub fn get(&self, column: &str) -> &str {
        self.values.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn serial(&self) -> &str {
        self.get(columns::SERIAL)
    }
}

/// Position of the first row whose serial matches.
///
/// This is a plain O(n) scan over the whole sheet and runs on every
/// update and delete; no index is kept. Duplicate serials always resolve
/// to the first physical row. Fine for the small sheets this serves, and
/// the scaling ceiling of the design.
pub fn locate_serial(rows: &[RawRow], serial: &str) -> Option<usize> {
    rows.iter().position(|row| serial_matches(row.serial(), serial))
}

/// Row-level access to a titled-sheet spreadsheet.
///
/// Each sheet's header row (at a fixed, configured offset) is its schema.
/// Update and delete address rows by serial, and report a missing row as
/// `Ok(false)`, not as an error.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Sheet titles in the spreadsheet's own order
    async fn list_sheets(&self) -> Result<Vec<String>>;

    /// Every data row below the header row
    async fn list_rows(&self, sheet: &str) -> Result<Vec<RawRow>>;

    /// Append a row; columns the sheet has no header for are dropped
    async fn append_row(&self, sheet: &str, values: &RowValues) -> Result<()>;

    /// Replace the mapped cells of the first row matching `serial`
    async fn overwrite_row(&self, sheet: &str, serial: &str, values: &RowValues) -> Result<bool>;

    /// Remove the first row matching `serial`
    async fn delete_row(&self, sheet: &str, serial: &str) -> Result<bool>;

    /// Short backend name for logs and metrics
    fn backend_name(&self) -> &'static str;

    /// First row whose `column` equals `value` exactly
    async fn find_one(&self, sheet: &str, column: &str, value: &str) -> Result<Option<RawRow>> {
        let rows = self.list_rows(sheet).await?;
        Ok(rows.into_iter().find(|row| row.values.get(column).map(String::as_str) == Some(value)))
    }

    /// Rows reduced to the requested columns; absent columns are left out
    async fn select_columns(&self, sheet: &str, wanted: &[&str]) -> Result<Vec<RowValues>> {
        let rows = self.list_rows(sheet).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                row.values
                    .into_iter()
                    .filter(|(column, _)| wanted.contains(&column.as_str()))
                    .collect()
            })
            .collect())
    }

    /// Rows accepted by `predicate`
    async fn query(
        &self,
        sheet: &str,
        predicate: &(dyn for<'r> Fn(&'r RawRow) -> bool + Send + Sync),
    ) -> Result<Vec<RawRow>> {
        let rows = self.list_rows(sheet).await?;
        Ok(rows.into_iter().filter(|row| predicate(row)).collect())
    }
}

/// Keep only the columns present in `headers`, in header order.
///
/// Returns the aligned cells and the names that had no header.
pub(crate) fn align_to_headers(headers: &[String], values: &RowValues) -> (Vec<String>, Vec<String>) {
    let cells = headers
        .iter()
        .map(|header| values.get(header).cloned().unwrap_or_default())
        .collect();
    let dropped = values
        .keys()
        .filter(|column| !headers.contains(column))
        .cloned()
        .collect();
    (cells, dropped)
}
