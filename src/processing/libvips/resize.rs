// src/processing/libvips/resize.rs

//! Width-driven resize for derivative profiles.

use libvips::{ops, VipsImage};
use crate::utils::ConverterError;

type Result<T> = std::result::Result<T, ConverterError>;

/// Resizes so the width becomes `target_w` (height scales proportionally).
///
/// Smaller sources are enlarged to the target width, matching the fixed
/// profile widths clients expect in the archives.
pub fn resize_to_width(image: &VipsImage, target_w: u32) -> Result<VipsImage> {
    let orig_w = image.get_width();
    if orig_w <= 0 {
        return Err(ConverterError::processing(format!(
            "Cannot resize image with width {orig_w}"
        )));
    }

    let scale = f64::from(target_w) / f64::from(orig_w);

    ops::resize(image, scale)
        .map_err(|e| ConverterError::processing(format!("Resize to {target_w}px failed: {e}")))
}
