pub mod batch;
pub mod libvips;

pub use batch::{BatchOutput, BatchProcessor, VariantBuffers};
pub use self::libvips::{ConvertedFile, convert_upload, ensure_vips};
