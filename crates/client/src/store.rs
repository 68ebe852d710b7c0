//! Optimistic record cache

use std::sync::Arc;

use brandsheet_common::{
    sync::{WriteAction, WriteRequest},
    Record,
};
use tracing::{debug, info, instrument};

use crate::{ClientError, LogNotifier, Notifier, SyncTransport};

/// Where the current write is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePhase {
    #[default]
    Idle,
    /// Local list already shows the change
    OptimisticApplied,
    /// Waiting for the sync API
    InFlight,
    /// Reloading the sheet after the request settled
    Reconciling,
}

/// How the sync API answered a write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Accepted,
    /// The user was notified with this message
    Rejected(String),
}

impl WriteOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, WriteOutcome::Accepted)
    }
}

/// Client-side view of one sheet.
///
/// Every write follows the same sequence: mutate the local list, send the
/// request, notify on failure, then reload the sheet whatever the result.
/// Failed writes are never reverted by hand and never retried; the reload
/// puts back whatever the spreadsheet holds.
pub struct RecordStore<T> {
    transport: T,
    notifier: Arc<dyn Notifier>,
    current_sheet: Option<String>,
    sheets: Vec<String>,
    records: Vec<Record>,
    loading: bool,
    phase: WritePhase,
}

impl<T: SyncTransport> RecordStore<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            notifier: Arc::new(LogNotifier),
            current_sheet: None,
            sheets: Vec::new(),
            records: Vec::new(),
            loading: false,
            phase: WritePhase::Idle,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Titles for the sheet selector, from the last successful load
    pub fn sheets(&self) -> &[String] {
        &self.sheets
    }

    pub fn current_sheet(&self) -> Option<&str> {
        self.current_sheet.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn phase(&self) -> WritePhase {
        self.phase
    }

    /// Serial suggested for a new entry
    pub fn next_serial(&self) -> String {
        (self.records.len() + 1).to_string()
    }

    /// Fetch `sheet` and replace the local list with it.
    ///
    /// The first successful load with no sheet chosen adopts the sheet the
    /// API resolved.
    #[instrument(skip(self))]
    pub async fn load(&mut self, sheet: Option<&str>) -> Result<(), ClientError> {
        self.loading = true;
        let result = self.transport.fetch(sheet).await;
        self.loading = false;

        let snapshot = result?;
        if self.current_sheet.is_none() {
            self.current_sheet = Some(snapshot.sheet);
        }
        self.sheets = snapshot.sheets;
        self.records = snapshot.data;

        debug!(records = self.records.len(), "Sheet loaded");
        Ok(())
    }

    /// Reload the current sheet
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let sheet = self.current_sheet.clone();
        self.load(sheet.as_deref()).await
    }

    /// Switch to another sheet and load it
    pub async fn select_sheet(&mut self, title: &str) -> Result<(), ClientError> {
        self.current_sheet = Some(title.to_string());
        self.load(Some(title)).await
    }

    /// Show a new record locally; the returned request still has to be synced
    pub fn apply_create(&mut self, record: Record) -> WriteRequest {
        self.records.push(record.clone());
        self.optimistic(WriteAction::Create, record)
    }

    /// Replace every local record with this serial
    pub fn apply_update(&mut self, record: Record) -> WriteRequest {
        for existing in self.records.iter_mut().filter(|r| r.has_serial(&record.serial)) {
            *existing = record.clone();
        }
        self.optimistic(WriteAction::Update, record)
    }

    pub fn apply_delete(&mut self, serial: &str) -> WriteRequest {
        self.records.retain(|r| !r.has_serial(serial));
        self.optimistic(WriteAction::Delete, Record::with_serial(serial))
    }

    pub async fn create(&mut self, record: Record) -> WriteOutcome {
        let request = self.apply_create(record);
        self.sync(request).await
    }

    pub async fn update(&mut self, record: Record) -> WriteOutcome {
        let request = self.apply_update(record);
        self.sync(request).await
    }

    pub async fn delete(&mut self, serial: &str) -> WriteOutcome {
        let request = self.apply_delete(serial);
        self.sync(request).await
    }

    fn optimistic(&mut self, action: WriteAction, mut record: Record) -> WriteRequest {
        self.phase = WritePhase::OptimisticApplied;
        record.row_index = None;
        WriteRequest {
            sheet_name: self.current_sheet.clone(),
            data: record,
            action,
        }
    }

    /// Send a write produced by one of the `apply_*` calls, then reload the
    /// sheet whatever the answer.
    pub async fn sync(&mut self, request: WriteRequest) -> WriteOutcome {
        self.phase = WritePhase::InFlight;
        let outcome = match self.transport.submit(&request).await {
            Ok(()) => {
                info!(action = %request.action, serial = %request.data.serial, "Write accepted");
                WriteOutcome::Accepted
            }
            Err(e) => {
                let message = format!("Failed to {} record: {}", verb(request.action), e.user_message());
                self.notifier.notify(&message);
                WriteOutcome::Rejected(message)
            }
        };

        self.phase = WritePhase::Reconciling;
        if let Err(e) = self.refresh().await {
            self.notifier
                .notify(&format!("Failed to reload sheet: {}", e.user_message()));
        }
        self.phase = WritePhase::Idle;

        outcome
    }
}

fn verb(action: WriteAction) -> &'static str {
    match action {
        WriteAction::Create => "create",
        WriteAction::Update => "update",
        WriteAction::Delete => "delete",
    }
}
