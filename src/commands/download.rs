//! Archive retrieval and the handles that point at it.

use std::path::Path;

use tracing::{debug, error};

use crate::storage::StorageRoot;
use crate::utils::RetrievalError;

/// Route served by the retrieval endpoint.
pub const DOWNLOAD_ROUTE: &str = "/api/download";

/// A stored archive read back for a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveDownload {
    /// Display name for the attachment
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Builds the retrieval URL for an archive.
pub fn download_handle(storage_path: &Path, file_name: &str) -> String {
    format!(
        "{DOWNLOAD_ROUTE}?path={}&filename={}",
        urlencoding::encode(&storage_path.to_string_lossy()),
        urlencoding::encode(file_name)
    )
}

/// Reads an archive on behalf of a client.
///
/// The path must resolve strictly inside the storage root; anything else is
/// refused before any file is opened.
pub async fn fetch_archive(
    storage: &StorageRoot,
    path: Option<&str>,
    file_name: Option<&str>,
) -> Result<ArchiveDownload, RetrievalError> {
    let (Some(path), Some(file_name)) = (non_empty(path), non_empty(file_name)) else {
        return Err(RetrievalError::MissingParameter);
    };

    let resolved = match storage.resolve_download(path).await {
        Ok(resolved) => resolved,
        Err(RetrievalError::Forbidden) => {
            debug!("Refused download outside storage root: {}", path);
            return Err(RetrievalError::Forbidden);
        }
        Err(e) => {
            log_unreadable(Path::new(path), &e);
            return Err(e);
        }
    };

    let bytes = tokio::fs::read(&resolved).await.map_err(|e| {
        let e = RetrievalError::from(e);
        log_unreadable(&resolved, &e);
        e
    })?;

    debug!("Serving {} ({} bytes) as {}", resolved.display(), bytes.len(), file_name);
    Ok(ArchiveDownload {
        file_name: file_name.to_string(),
        bytes,
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn log_unreadable(path: &Path, err: &RetrievalError) {
    let cause = match err {
        RetrievalError::Unreadable { source } => source.to_string(),
        other => other.to_string(),
    };
    error!("Error downloading file {}: {}", path.display(), cause);
}
