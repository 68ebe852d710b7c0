//! Brandsheet client data store
//!
//! Keeps the records of the selected sheet in memory for the dashboard.
//! Edits are applied locally first, sent to the sync API, and then the
//! whole sheet is reloaded so the cache converges on what the spreadsheet
//! actually holds.

mod error;
mod notify;
mod store;
mod transport;

pub use error::ClientError;
pub use notify::{LogNotifier, Notifier};
pub use store::{RecordStore, WriteOutcome, WritePhase};
pub use transport::{HttpSyncTransport, SyncTransport};
