use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{debug, warn};
use crate::core::{FileReport, Profile, UploadItem, Variant};
use crate::processing::ConvertedFile;
use crate::worker::WorkerPool;
use super::BatchMetrics;

/// Per-profile variant buffers filled during fan-in.
#[derive(Debug, Clone, Default)]
pub struct VariantBuffers {
    pub desktop: Vec<Variant>,
    pub mobile: Vec<Variant>,
}

impl VariantBuffers {
    pub fn push(&mut self, variant: Variant) {
        match variant.profile {
            Profile::Desktop => self.desktop.push(variant),
            Profile::Mobile => self.mobile.push(variant),
        }
    }
}

/// Everything a batch produced, in upload order.
#[derive(Debug, Clone, Default)]
pub struct BatchOutput {
    pub reports: Vec<FileReport>,
    pub buffers: VariantBuffers,
    pub metrics: BatchMetrics,
}

/// Fans a batch out over the worker pool and gathers the results.
pub struct BatchProcessor {
    pool: WorkerPool,
}

impl BatchProcessor {
    pub fn new(pool: WorkerPool) -> Self {
        Self { pool }
    }

    /// Converts every item concurrently and waits for all of them.
    ///
    /// Returns exactly one report per item. Reports and buffers keep the
    /// input order regardless of completion order.
    pub async fn process_batch(&self, items: Vec<UploadItem>) -> BatchOutput {
        let started = Instant::now();
        let total = items.len();
        debug!("Processing batch of {} files on {} workers", total, self.pool.worker_count());

        let mut tasks = JoinSet::new();
        let mut sizes = Vec::with_capacity(total);
        for (index, item) in items.into_iter().enumerate() {
            sizes.push((item.name.clone(), item.size));
            let pool = self.pool.clone();
            tasks.spawn(async move {
                let name = item.name.clone();
                let result = pool.process(item).await.unwrap_or_else(|e| {
                    warn!("Worker failed for {}: {}", name, e);
                    ConvertedFile::failed(&name, e)
                });
                (index, result)
            });
        }

        let mut slots: Vec<Option<ConvertedFile>> = vec![None; total];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, converted)) => slots[index] = Some(converted),
                // A slot left empty here is filled with a failure below.
                Err(e) => warn!("Batch task aborted: {}", e),
            }
        }

        let mut output = BatchOutput::default();
        for ((name, size), slot) in sizes.into_iter().zip(slots) {
            let converted = slot.unwrap_or_else(|| {
                ConvertedFile::failed(&name, "Processing task was aborted")
            });

            output.metrics.record_file(size, &converted.report);
            for variant in converted.variants {
                output.metrics.record_variant(&variant);
                output.buffers.push(variant);
            }
            output.reports.push(converted.report);
        }

        output.metrics.elapsed = started.elapsed();
        output.metrics.log_summary();
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_jpeg;
    use bytes::Bytes;

    #[tokio::test]
    async fn one_report_per_item_in_input_order() -> anyhow::Result<()> {
        let jpeg = Bytes::from(sample_jpeg(1200, 800)?);
        let items = vec![
            UploadItem::new("a.jpg", jpeg.clone()),
            UploadItem::new("bad.png", Bytes::from_static(b"\x89PNG broken")),
            UploadItem::new("c.jpeg", jpeg),
        ];

        let output = BatchProcessor::new(WorkerPool::new(3)).process_batch(items).await;

        let names: Vec<&str> = output.reports.iter().map(FileReport::name).collect();
        assert_eq!(names, ["a.jpg", "bad.png", "c.jpeg"]);
        assert!(output.reports[0].is_success());
        assert!(!output.reports[1].is_success());
        assert!(output.reports[2].is_success());

        let desktop: Vec<&str> = output.buffers.desktop.iter().map(|v| v.name.as_str()).collect();
        let mobile: Vec<&str> = output.buffers.mobile.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(desktop, ["a.webp", "c.webp"]);
        assert_eq!(mobile, ["a.webp", "c.webp"]);

        assert_eq!(output.metrics.files, 3);
        assert_eq!(output.metrics.succeeded, 2);
        assert_eq!(output.metrics.failed, 1);
        Ok(())
    }

    #[tokio::test]
    async fn empty_batch_yields_nothing() {
        let output = BatchProcessor::new(WorkerPool::new(1)).process_batch(Vec::new()).await;
        assert!(output.reports.is_empty());
        assert!(output.buffers.desktop.is_empty());
        assert!(output.buffers.mobile.is_empty());
    }
}
