//! The batch conversion operation.

use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::core::{AppState, ArchiveBundle, ConvertResponse, Profile, UploadItem, Variant};
use crate::processing::VariantBuffers;
use crate::storage::{BatchDir, BatchGuard, write_archive};
use crate::utils::{ConverterError, ConverterResult};
use super::download::download_handle;

/// Converts a batch of uploads and packages the results.
///
/// An empty batch returns the "no files" response without touching the
/// filesystem. Per-file failures are reported inside the response; an `Err`
/// means the batch itself failed (directory or archive could not be written).
/// If the returned future is dropped before completion, the batch directory
/// is removed.
///
/// # Arguments
/// * `state` - Shared application state (storage root, worker pool, expiry)
/// * `items` - Uploaded files in request order
pub async fn convert_batch(state: &AppState, items: Vec<UploadItem>) -> ConverterResult<ConvertResponse> {
    if items.is_empty() {
        debug!("Conversion requested without files");
        return Ok(ConvertResponse::no_files());
    }

    let batch = BatchGuard::new(state.storage().allocate_batch().await?);
    info!("Batch {} started with {} files", batch.id, items.len());

    let output = state.create_processor().process_batch(items).await;

    let bundles = match build_archives(&batch, output.buffers).await {
        Ok(bundles) => bundles,
        Err(e) => {
            error!("Batch {} failed while archiving: {}", batch.id, e);
            let batch = batch.disarm();
            if let Err(cleanup) = tokio::fs::remove_dir_all(&batch.path).await {
                warn!("Error removing failed batch directory {}: {}", batch.path.display(), cleanup);
            }
            return Err(e);
        }
    };

    state.expiry().schedule(batch.disarm().path);

    let url_for = |profile: Profile| {
        bundles
            .iter()
            .find(|bundle| bundle.profile == profile)
            .map(|bundle| bundle.download_url.clone())
            .ok_or_else(|| ConverterError::archive(format!("Missing {} archive", profile.archive_name())))
    };

    Ok(ConvertResponse::completed(
        output.reports,
        url_for(Profile::Desktop)?,
        url_for(Profile::Mobile)?,
    ))
}

/// Writes one archive per profile into the batch directory.
///
/// Runs after every file has been processed; the buffers are final here.
async fn build_archives(batch: &BatchDir, buffers: VariantBuffers) -> ConverterResult<Vec<ArchiveBundle>> {
    let VariantBuffers { desktop, mobile } = buffers;
    let mut bundles = Vec::with_capacity(Profile::ALL.len());

    for (profile, variants) in [(Profile::Desktop, desktop), (Profile::Mobile, mobile)] {
        let entries = variants.len();
        let bundle = build_archive(&batch.path, profile, variants).await?;
        debug!(
            "Batch {} {} archive: {} entries, {} bytes",
            batch.id,
            profile.archive_name(),
            entries,
            bundle.size
        );
        bundles.push(bundle);
    }

    Ok(bundles)
}

async fn build_archive(dir: &Path, profile: Profile, variants: Vec<Variant>) -> ConverterResult<ArchiveBundle> {
    let storage_path = dir.join(profile.archive_name());
    let target = storage_path.clone();

    let size = tokio::task::spawn_blocking(move || write_archive(&target, &variants))
        .await
        .map_err(|e| ConverterError::archive(format!("Archive task panicked: {e}")))??;

    Ok(ArchiveBundle {
        profile,
        download_url: download_handle(&storage_path, profile.archive_name()),
        storage_path,
        size,
    })
}
