//! Shared application state handed to every request.

use std::sync::Arc;
use tracing::debug;

use crate::core::ServerConfig;
use crate::processing::{BatchProcessor, ensure_vips};
use crate::storage::{ExpiryScheduler, StorageRoot};
use crate::utils::ConverterResult;
use crate::worker::WorkerPool;

/// Application state shared by the HTTP handlers.
///
/// Cheap to clone; every clone shares the same worker pool and storage root.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ServerConfig>,
    storage: StorageRoot,
    pool: WorkerPool,
    expiry: ExpiryScheduler,
}

impl AppState {
    /// Initializes libvips, opens the storage root and sizes the worker pool.
    pub async fn new(config: ServerConfig) -> ConverterResult<Self> {
        ensure_vips()?;
        let storage = StorageRoot::open(&config.storage_root).await?;
        let pool = WorkerPool::new(config.workers);
        let expiry = ExpiryScheduler::new(config.retention);
        debug!(
            "AppState initialized (root: {}, workers: {})",
            storage.path().display(),
            pool.worker_count()
        );

        Ok(Self {
            config: Arc::new(config),
            storage,
            pool,
            expiry,
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn storage(&self) -> &StorageRoot {
        &self.storage
    }

    pub fn expiry(&self) -> &ExpiryScheduler {
        &self.expiry
    }

    /// Creates a batch processor bound to the shared worker pool.
    pub fn create_processor(&self) -> BatchProcessor {
        BatchProcessor::new(self.pool.clone())
    }
}
