//! Shared fixtures for unit tests.

use std::path::Path;
use std::time::Duration;

use anyhow::anyhow;
use libvips::{VipsImage, ops};

use crate::core::{AppState, ServerConfig};
use crate::processing::ensure_vips;

/// Encodes a black `width`×`height` JPEG.
pub(crate) fn sample_jpeg(width: i32, height: i32) -> anyhow::Result<Vec<u8>> {
    ensure_vips()?;
    let image = ops::black(width, height).map_err(|e| anyhow!("black: {e}"))?;
    ops::jpegsave_buffer(&image).map_err(|e| anyhow!("jpegsave: {e}"))
}

/// Decodes any image libvips understands.
///
/// The returned image borrows `bytes` lazily, so keep them alive while it is used.
pub(crate) fn load_image(bytes: &[u8]) -> anyhow::Result<VipsImage> {
    ensure_vips()?;
    VipsImage::new_from_buffer(bytes, "").map_err(|e| anyhow!("decode: {e}"))
}

/// State rooted in `root` with a long retention and two workers.
pub(crate) async fn test_state(root: &Path) -> anyhow::Result<AppState> {
    let config = ServerConfig {
        storage_root: root.join("storage"),
        retention: Duration::from_secs(3600),
        workers: 2,
        ..ServerConfig::default()
    };
    Ok(AppState::new(config).await?)
}
