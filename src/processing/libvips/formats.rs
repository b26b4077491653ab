// src/processing/libvips/formats.rs

//! WebP encoding policy for derivative images.

use libvips::ops::{self, ForeignKeep};
use libvips::VipsImage;

use crate::utils::{ConverterError, ImageFormat};

type Result<T> = std::result::Result<T, ConverterError>;

/// Fixed encoder settings applied to every derivative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodePolicy {
    pub format: ImageFormat,
    /// 1-100
    pub quality: i32,
    /// 0-6, higher is slower and smaller
    pub effort: i32,
    pub lossless: bool,
}

/// Lossy WebP at maximum quality and effort.
pub const DERIVATIVE_POLICY: EncodePolicy = EncodePolicy {
    format: ImageFormat::WebP,
    quality: 100,
    effort: 6,
    lossless: false,
};

/// Encodes `image` as WebP in memory.
///
/// Metadata is stripped so derivative sizes reflect pixel data only.
pub fn encode_webp(image: &VipsImage, policy: &EncodePolicy) -> Result<Vec<u8>> {
    let opts = ops::WebpsaveBufferOptions {
        q: policy.quality,
        lossless: policy.lossless,
        effort: policy.effort,
        keep: ForeignKeep::None,
        ..ops::WebpsaveBufferOptions::default()
    };

    ops::webpsave_buffer_with_opts(image, &opts)
        .map_err(|e| ConverterError::encode(format!("WebP save failed: {e}")))
}
