//! Surfacing failures to the user

use tracing::warn;

/// Receives one message per failed load or write
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Writes notifications to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        warn!(%message, "Sync failure");
    }
}
