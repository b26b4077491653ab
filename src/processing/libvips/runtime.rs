// src/processing/libvips/runtime.rs

//! Process-wide libvips lifecycle.

use lazy_static::lazy_static;
use tracing::debug;

use crate::utils::{ConverterError, ConverterResult};

/// Thread-safe guard for the libvips `VipsApp` lifecycle.
///
/// `VipsApp` initializes the libvips thread pool and global state on creation
/// and shuts it down on drop. Held in a static, it is never dropped, so
/// libvips stays up for the whole process and a second init never happens.
struct VipsAppGuard(libvips::VipsApp);

// libvips is designed for concurrent use; individual VipsImage instances must
// not be shared between threads, but concurrent creation on separate threads is safe.
unsafe impl Send for VipsAppGuard {}
unsafe impl Sync for VipsAppGuard {}

lazy_static! {
    static ref VIPS: Result<VipsAppGuard, String> = {
        match libvips::VipsApp::default("image-converter") {
            Ok(vips) => {
                // 0 = let libvips decide based on available CPU cores
                vips.concurrency_set(0);
                debug!("libvips initialized (concurrency: {})", vips.concurency_get());
                Ok(VipsAppGuard(vips))
            }
            Err(e) => Err(e.to_string()),
        }
    };
}

/// Initializes libvips on first call; later calls are free.
pub fn ensure_vips() -> ConverterResult<()> {
    VIPS.as_ref()
        .map(|_| ())
        .map_err(|e| ConverterError::processing(format!("Failed to initialize libvips: {e}")))
}
