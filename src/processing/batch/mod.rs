mod metrics;
mod processor;

pub use metrics::BatchMetrics;
pub use processor::{BatchOutput, BatchProcessor, VariantBuffers};
