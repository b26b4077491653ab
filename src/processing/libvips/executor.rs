// src/processing/libvips/executor.rs

//! Blocking per-file conversion driven directly by libvips.
//!
//! Every upload is decoded once and then resized and encoded for each
//! profile. Callers run [`convert_upload`] inside `tokio::task::spawn_blocking`
//! so the async runtime is never blocked.

use std::time::Instant;

use libvips::VipsImage;
use tracing::{debug, warn};

use crate::core::{FileReport, Profile, ProfileReport, UploadItem, Variant};
use crate::utils::{ConverterError, ConverterResult, rewrite_extension};

use super::formats::{DERIVATIVE_POLICY, encode_webp};
use super::resize::resize_to_width;
use super::runtime::ensure_vips;

/// Loader options: reject truncated or damaged input instead of padding it.
const LOAD_OPTIONS: &str = "[fail_on=warning]";

/// Report and derivatives produced for one upload.
///
/// `variants` is empty whenever `report` is a failure.
#[derive(Debug, Clone)]
pub struct ConvertedFile {
    pub report: FileReport,
    pub variants: Vec<Variant>,
}

impl ConvertedFile {
    pub fn failed(name: &str, error: impl ToString) -> Self {
        Self {
            report: FileReport::failed(name, error),
            variants: Vec::new(),
        }
    }
}

/// Converts one upload into its desktop and mobile variants.
///
/// The file is the unit of failure: if any profile fails, no variant is
/// returned and the report carries the error.
pub fn convert_upload(item: &UploadItem) -> ConvertedFile {
    let started = Instant::now();

    match render_profiles(item) {
        Ok(encoded) => {
            let time_ms = started.elapsed().as_secs_f64() * 1000.0;
            finish(item, encoded, time_ms)
        }
        Err(e) => {
            warn!("Error processing {}: {}", item.name, e);
            ConvertedFile::failed(&item.name, e)
        }
    }
}

// ── Blocking image processing ─────────────────────────────────────────────────────────

/// Decodes `item` and encodes every profile, returning `(profile, bytes)` pairs
/// in [`Profile::ALL`] order.
fn render_profiles(item: &UploadItem) -> ConverterResult<Vec<(Profile, Vec<u8>)>> {
    ensure_vips()?;

    let image = VipsImage::new_from_buffer(&item.bytes, LOAD_OPTIONS)
        .map_err(|e| ConverterError::decode(format!("Failed to load '{}': {e}", item.name)))?;

    debug!(
        "Loaded '{}': {}×{}",
        item.name,
        image.get_width(),
        image.get_height()
    );

    Profile::ALL
        .iter()
        .map(|profile| -> ConverterResult<(Profile, Vec<u8>)> {
            let resized = resize_to_width(&image, profile.width())?;
            let bytes = encode_webp(&resized, &DERIVATIVE_POLICY)?;
            Ok((*profile, bytes))
        })
        .collect()
}

fn finish(item: &UploadItem, encoded: Vec<(Profile, Vec<u8>)>, time_ms: f64) -> ConvertedFile {
    let output_name = rewrite_extension(&item.name, DERIVATIVE_POLICY.format);
    let report_for = |wanted: Profile| {
        encoded
            .iter()
            .find(|(profile, _)| *profile == wanted)
            .map(|(_, bytes)| ProfileReport::new(item.size, bytes.len() as u64, time_ms))
    };

    let (Some(desktop), Some(mobile)) = (report_for(Profile::Desktop), report_for(Profile::Mobile)) else {
        return ConvertedFile::failed(&item.name, ConverterError::processing("Missing profile output"));
    };

    debug!(
        "'{}' → desktop {} bytes ({:.1}%), mobile {} bytes ({:.1}%) in {:.2}ms",
        item.name, desktop.size, desktop.ratio, mobile.size, mobile.ratio, time_ms
    );

    let variants = encoded
        .into_iter()
        .map(|(profile, bytes)| Variant {
            profile,
            name: output_name.clone(),
            bytes,
        })
        .collect();

    ConvertedFile {
        report: FileReport::Processed {
            name: item.name.clone(),
            original_size: item.size,
            desktop,
            mobile,
        },
        variants,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reduction_ratio;
    use crate::test_support::{load_image, sample_jpeg};
    use bytes::Bytes;

    #[test]
    fn converts_both_profiles() -> anyhow::Result<()> {
        let item = UploadItem::new("Holiday.JPG", Bytes::from(sample_jpeg(2000, 1500)?));
        let converted = convert_upload(&item);

        let FileReport::Processed { name, original_size, desktop, mobile } = &converted.report else {
            anyhow::bail!("expected success, got {:?}", converted.report);
        };
        assert_eq!(name, "Holiday.JPG");
        assert_eq!(*original_size, item.size);
        assert!(desktop.size > 0 && mobile.size > 0);
        assert_eq!(desktop.ratio, reduction_ratio(item.size, desktop.size));
        assert_eq!(mobile.ratio, reduction_ratio(item.size, mobile.size));
        assert_eq!(desktop.time_ms, mobile.time_ms);

        assert_eq!(converted.variants.len(), 2);
        for variant in &converted.variants {
            assert_eq!(variant.name, "Holiday.webp");
            let decoded = load_image(&variant.bytes)?;
            assert_eq!(decoded.get_width() as u32, variant.profile.width());
        }
        let desktop_variant = &converted.variants[0];
        assert_eq!(desktop_variant.profile, Profile::Desktop);
        assert_eq!(desktop_variant.bytes.len() as u64, desktop.size);
        Ok(())
    }

    #[test]
    fn undecodable_bytes_fail_without_variants() {
        let item = UploadItem::new("bad.png", Bytes::from_static(b"definitely not a png"));
        let converted = convert_upload(&item);

        assert!(converted.variants.is_empty());
        match converted.report {
            FileReport::Failed { name, error } => {
                assert_eq!(name, "bad.png");
                assert!(!error.is_empty());
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn truncated_jpeg_is_reported_as_failure() -> anyhow::Result<()> {
        let jpeg = sample_jpeg(2000, 1500)?;
        assert!(jpeg.len() > 2048);
        let truncated = Bytes::copy_from_slice(&jpeg[..jpeg.len() / 2]);
        let converted = convert_upload(&UploadItem::new("cut.jpg", truncated));

        assert!(!converted.report.is_success());
        assert!(converted.variants.is_empty());
        Ok(())
    }
}
