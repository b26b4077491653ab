use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;
use tracing::{debug, warn};
use crate::core::UploadItem;
use crate::processing::{ConvertedFile, convert_upload};
use crate::utils::{ConverterError, ConverterResult};

/// Bounded pool for CPU-bound conversions.
///
/// Each conversion runs on tokio's blocking thread pool; the semaphore caps
/// how many run at once across all concurrent batches.
#[derive(Clone)]
pub struct WorkerPool {
    active_workers: Arc<AtomicUsize>,
    semaphore: Arc<Semaphore>,
    worker_count: usize,
}

impl WorkerPool {
    pub fn new(worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        Self {
            active_workers: Arc::new(AtomicUsize::new(0)),
            semaphore: Arc::new(Semaphore::new(worker_count)),
            worker_count,
        }
    }

    /// Converts one upload once a worker slot is free.
    ///
    /// Decode and encode failures come back inside the [`ConvertedFile`];
    /// an `Err` means the worker itself failed (closed pool or panic).
    pub async fn process(&self, item: UploadItem) -> ConverterResult<ConvertedFile> {
        let _permit = self.semaphore.acquire().await.map_err(|e| {
            warn!("Failed to acquire semaphore: {}", e);
            ConverterError::processing(format!("Failed to acquire worker: {}", e))
        })?;

        let current_workers = self.active_workers.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(
            "Worker started - Active: {}/{}, Task: {}",
            current_workers, self.worker_count, item.name
        );

        let result = tokio::task::spawn_blocking(move || convert_upload(&item))
            .await
            .map_err(|e| ConverterError::processing(format!("Task panicked: {e}")));

        let remaining = self.active_workers.fetch_sub(1, Ordering::SeqCst) - 1;
        debug!("Worker finished - Active: {}/{}", remaining, self.worker_count);

        result
    }

    pub fn active_workers(&self) -> usize {
        self.active_workers.load(Ordering::SeqCst)
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }
}
