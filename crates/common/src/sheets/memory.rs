//! In-process sheet store.
//!
//! Mirrors the Google backend's behaviour (header offset, header-bound
//! columns, first-match serial lookup) without any I/O.

use super::{align_to_headers, locate_serial, RawRow, RowValues, SheetStore};
use crate::errors::{AppError, Result};
use crate::records::columns;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
struct MemorySheet {
    title: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl MemorySheet {
    fn raw_rows(&self, header_row: u32) -> Vec<RawRow> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, cells)| {
                let values = self
                    .headers
                    .iter()
                    .zip(cells.iter().chain(std::iter::repeat(&String::new())))
                    .map(|(header, cell)| (header.clone(), cell.clone()))
                    .collect();
                RawRow::at(header_row + 1 + i as u32, values)
            })
            .collect()
    }
}

/// Spreadsheet held in memory
pub struct MemorySheetStore {
    header_row: u32,
    sheets: RwLock<Vec<MemorySheet>>,
}

impl MemorySheetStore {
    /// Create an empty spreadsheet
    pub fn new(header_row: u32) -> Self {
        Self {
            header_row,
            sheets: RwLock::new(Vec::new()),
        }
    }

    /// A spreadsheet with one empty sheet carrying the canonical headers
    pub fn with_default_sheet(header_row: u32, title: &str) -> Self {
        let headers: Vec<&str> = columns::CANONICAL.to_vec();
        Self::new(header_row).with_sheet(title, &headers, Vec::new())
    }

    /// Add a sheet with the given headers and rows (cells in header order)
    pub fn with_sheet(mut self, title: &str, headers: &[&str], rows: Vec<Vec<&str>>) -> Self {
        let sheet = MemorySheet {
            title: title.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .into_iter()
                .map(|cells| cells.into_iter().map(str::to_string).collect())
                .collect(),
        };
        self.sheets.get_mut().push(sheet);
        self
    }

    fn not_found(title: &str) -> AppError {
        AppError::SheetNotFound {
            title: title.to_string(),
        }
    }
}

#[async_trait]
impl SheetStore for MemorySheetStore {
    async fn list_sheets(&self) -> Result<Vec<String>> {
        let sheets = self.sheets.read().await;
        Ok(sheets.iter().map(|s| s.title.clone()).collect())
    }

    async fn list_rows(&self, sheet: &str) -> Result<Vec<RawRow>> {
        let sheets = self.sheets.read().await;
        let found = sheets
            .iter()
            .find(|s| s.title == sheet)
            .ok_or_else(|| Self::not_found(sheet))?;
        Ok(found.raw_rows(self.header_row))
    }

    async fn append_row(&self, sheet: &str, values: &RowValues) -> Result<()> {
        let mut sheets = self.sheets.write().await;
        let found = sheets
            .iter_mut()
            .find(|s| s.title == sheet)
            .ok_or_else(|| Self::not_found(sheet))?;

        let (cells, dropped) = align_to_headers(&found.headers, values);
        if !dropped.is_empty() {
            warn!(sheet, ?dropped, "Columns without a header were not written");
        }
        found.rows.push(cells);
        debug!(sheet, rows = found.rows.len(), "Row appended");
        Ok(())
    }

    async fn overwrite_row(&self, sheet: &str, serial: &str, values: &RowValues) -> Result<bool> {
        let mut sheets = self.sheets.write().await;
        let header_row = self.header_row;
        let found = sheets
            .iter_mut()
            .find(|s| s.title == sheet)
            .ok_or_else(|| Self::not_found(sheet))?;

        let Some(position) = locate_serial(&found.raw_rows(header_row), serial) else {
            return Ok(false);
        };

        let headers = found.headers.clone();
        let cells = &mut found.rows[position];
        cells.resize(headers.len(), String::new());
        for (header, cell) in headers.iter().zip(cells.iter_mut()) {
            if let Some(value) = values.get(header) {
                *cell = value.clone();
            }
        }

        let (_, dropped) = align_to_headers(&headers, values);
        if !dropped.is_empty() {
            warn!(sheet, serial, ?dropped, "Columns without a header were not written");
        }
        Ok(true)
    }

    async fn delete_row(&self, sheet: &str, serial: &str) -> Result<bool> {
        let mut sheets = self.sheets.write().await;
        let header_row = self.header_row;
        let found = sheets
            .iter_mut()
            .find(|s| s.title == sheet)
            .ok_or_else(|| Self::not_found(sheet))?;

        match locate_serial(&found.raw_rows(header_row), serial) {
            Some(position) => {
                found.rows.remove(position);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
