//! Delayed deletion of batch directories.

use std::path::PathBuf;
use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

/// Schedules best-effort removal of batch directories.
///
/// Each scheduled removal is a detached task that owns its directory path.
/// Nothing cancels or extends it; failures are logged and dropped.
#[derive(Debug, Clone)]
pub struct ExpiryScheduler {
    retention: Duration,
}

impl ExpiryScheduler {
    pub fn new(retention: Duration) -> Self {
        Self { retention }
    }

    /// Removes `dir` once the retention period has elapsed.
    ///
    /// Must be called from within a tokio runtime. Returns the deadline.
    pub fn schedule(&self, dir: PathBuf) -> Instant {
        let deadline = Instant::now() + self.retention;
        debug!(
            "Scheduled cleanup of {} in {}s",
            dir.display(),
            self.retention.as_secs()
        );

        tokio::spawn(async move {
            sleep_until(deadline).await;
            match tokio::fs::remove_dir_all(&dir).await {
                Ok(()) => info!("Cleaned up temporary directory: {}", dir.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!("Temporary directory already gone: {}", dir.display())
                }
                Err(e) => warn!("Error cleaning up temporary directory {}: {}", dir.display(), e),
            }
        });

        deadline
    }
}
