// Module declarations in dependency order
pub mod utils;
pub mod core;
pub mod worker;
pub mod processing;
pub mod storage;
pub mod commands;
pub mod http;

#[cfg(test)]
pub(crate) mod test_support;

// Public exports for external consumers
pub use core::{AppState, ConvertResponse, FileReport, Profile, ServerConfig, UploadItem};
pub use utils::{ConverterError, ConverterResult, RetrievalError};
pub use commands::{convert_batch, fetch_archive};
pub use http::build_router;
