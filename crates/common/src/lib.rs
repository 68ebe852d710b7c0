//! Brandsheet Common Library
//!
//! Shared code for the Brandsheet services including:
//! - Spreadsheet gateway (the only component talking to the backing sheet)
//! - Record mapping between raw rows and typed brand records
//! - Sync service core and wire types
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod config;
pub mod errors;
pub mod metrics;
pub mod records;
pub mod sheets;
pub mod sync;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use records::Record;
pub use sheets::{SharedStore, SheetStore};
pub use sync::{SyncService, WriteAction, WriteRequest};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Sheet used when a write names no target sheet
pub const DEFAULT_SHEET: &str = "Sheet1";

/// 1-based row holding the column headers of every sheet
pub const DEFAULT_HEADER_ROW: u32 = 2;
