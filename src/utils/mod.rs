pub mod error;
pub mod formats;
pub mod fs;

pub use error::{ConverterError, ConverterResult, RetrievalError};
pub use formats::{ImageFormat, rewrite_extension};
pub use fs::{is_strictly_within, resolve_lexically};
