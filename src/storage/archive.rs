//! ZIP assembly for a profile's variants.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;
use zip::CompressionMethod;
use zip::write::FileOptions;

use crate::core::Variant;
use crate::utils::{ConverterError, ConverterResult};

/// Deflate level used for archive entries.
const COMPRESSION_LEVEL: i32 = 9;

/// Collapses duplicate entry names: the last variant with a name wins and
/// takes the position of the first one.
fn dedupe_entries(variants: &[Variant]) -> Vec<&Variant> {
    let mut entries: Vec<&Variant> = Vec::with_capacity(variants.len());
    for variant in variants {
        match entries.iter_mut().find(|existing| existing.name == variant.name) {
            Some(slot) => *slot = variant,
            None => entries.push(variant),
        }
    }
    entries
}

/// Writes `variants` to a new ZIP file at `output_path`, blocking.
///
/// An empty slice still produces a valid, empty archive. Returns the archive
/// size in bytes.
pub fn write_archive(output_path: &Path, variants: &[Variant]) -> ConverterResult<u64> {
    let file = File::create(output_path).map_err(|e| {
        ConverterError::archive(format!("Cannot create {}: {e}", output_path.display()))
    })?;
    let mut zip = zip::ZipWriter::new(BufWriter::new(file));
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(COMPRESSION_LEVEL));

    for variant in dedupe_entries(variants) {
        zip.start_file(variant.name.as_str(), options)?;
        zip.write_all(&variant.bytes)?;
    }

    let mut writer = zip.finish()?;
    writer.flush()?;
    drop(writer);

    let size = std::fs::metadata(output_path)?.len();
    debug!("Zip archive created: {} ({} bytes)", output_path.display(), size);
    Ok(size)
}
