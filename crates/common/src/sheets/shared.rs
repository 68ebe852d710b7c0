//! Process-wide store handle.
//!
//! The backing connection is created on first use and then shared by
//! every request. Creation goes through an injectable factory, so tests
//! can hand in a fake. A failed creation is not remembered: the next call
//! runs the factory again.

use super::{GoogleSheetsStore, MemorySheetStore, SheetStore};
use crate::config::{SheetsBackend, SheetsConfig};
use crate::errors::Result;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

/// Builds the backing store on first use
pub type StoreFactory = Arc<dyn Fn() -> BoxFuture<'static, Result<Arc<dyn SheetStore>>> + Send + Sync>;

/// Lazily initialized, cheaply cloneable handle to the backing store
#[derive(Clone)]
pub struct SharedStore {
    cell: Arc<OnceCell<Arc<dyn SheetStore>>>,
    factory: StoreFactory,
}

impl SharedStore {
    /// Handle that runs `factory` on first use
    pub fn new<F, Fut>(factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Arc<dyn SheetStore>>> + Send + 'static,
    {
        Self {
            cell: Arc::new(OnceCell::new()),
            factory: Arc::new(move || factory().boxed()),
        }
    }

    /// Handle around an already built store
    pub fn ready(store: Arc<dyn SheetStore>) -> Self {
        Self::new(move || {
            let store = store.clone();
            async move { Ok(store) }
        })
    }

    /// Handle for the backend selected in configuration
    pub fn from_config(config: &SheetsConfig) -> Self {
        let config = config.clone();
        Self::new(move || {
            let config = config.clone();
            async move {
                let store: Arc<dyn SheetStore> = match config.backend {
                    SheetsBackend::Google => Arc::new(GoogleSheetsStore::connect(&config).await?),
                    SheetsBackend::Memory => Arc::new(MemorySheetStore::with_default_sheet(
                        config.header_row,
                        &config.default_sheet,
                    )),
                };
                info!(backend = store.backend_name(), "Spreadsheet backend initialized");
                Ok(store)
            }
        })
    }

    /// The shared store, creating it if this is the first call
    pub async fn get(&self) -> Result<Arc<dyn SheetStore>> {
        self.cell
            .get_or_try_init(|| (self.factory)())
            .await
            .map(Arc::clone)
    }

    /// Whether a store has been created yet
    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}
