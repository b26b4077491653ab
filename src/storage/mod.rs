//! Batch storage: directory allocation, archive files, retrieval paths and expiry.

mod archive;
mod expiry;
mod root;

pub use archive::write_archive;
pub use expiry::ExpiryScheduler;
pub use root::{BatchDir, BatchGuard, StorageRoot};
