use std::time::Duration;
use tracing::info;
use crate::core::{FileReport, Profile, Variant};

/// Counters for one batch, logged once all files are done.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchMetrics {
    pub files: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub input_bytes: u64,
    pub desktop_bytes: u64,
    pub mobile_bytes: u64,
    pub elapsed: Duration,
}

impl BatchMetrics {
    pub fn record_file(&mut self, original_size: u64, report: &FileReport) {
        self.files += 1;
        self.input_bytes += original_size;
        if report.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn record_variant(&mut self, variant: &Variant) {
        let size = variant.bytes.len() as u64;
        match variant.profile {
            Profile::Desktop => self.desktop_bytes += size,
            Profile::Mobile => self.mobile_bytes += size,
        }
    }

    pub fn log_summary(&self) {
        info!(
            "Batch processed: {} files ({} ok, {} failed), {} KB in → desktop {} KB / mobile {} KB in {:.2}s",
            self.files,
            self.succeeded,
            self.failed,
            self.input_bytes / 1024,
            self.desktop_bytes / 1024,
            self.mobile_bytes / 1024,
            self.elapsed.as_secs_f64()
        );
    }
}
