//! Transport-independent operations exposed by the service.
//!
//! - [`convert_batch`]: Convert and package a batch of uploads
//! - [`fetch_archive`]: Read back an archive produced by a batch

mod convert;
mod download;

pub use convert::convert_batch;
pub use download::{ArchiveDownload, DOWNLOAD_ROUTE, download_handle, fetch_archive};
