//! Multipart intake for conversion requests.

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use bytes::Bytes;
use tracing::{debug, warn};

use crate::core::UploadItem;

/// Multipart field name carrying uploaded files.
pub const FILES_FIELD: &str = "files";

/// Name used when a part carries no file name.
const UNKNOWN_FILE_NAME: &str = "unknown";

/// Outcome of reading a multipart payload.
#[derive(Debug)]
pub enum Intake {
    /// Accepted files in request order (possibly none)
    Files(Vec<UploadItem>),
    /// The payload could not be read completely
    Broken { status: StatusCode, message: String },
}

impl Intake {
    fn broken(err: &MultipartError) -> Self {
        Self::Broken {
            status: err.status(),
            message: format!("Could not read upload: {}", err.body_text()),
        }
    }
}

/// Turns one multipart part into an upload, or `None` if it must be skipped.
pub fn accept_part(field_name: Option<&str>, file_name: Option<&str>, data: Bytes) -> Option<UploadItem> {
    if field_name != Some(FILES_FIELD) || data.is_empty() {
        return None;
    }
    let name = file_name
        .filter(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_FILE_NAME);
    Some(UploadItem::new(name, data))
}

/// Reads every part of `multipart`, keeping usable `files` entries.
///
/// A stream error before any file was accepted is treated like an empty
/// upload, unless the body was too large. After the first file any error
/// breaks the batch so a partial upload is never converted silently.
pub async fn read_uploads(mut multipart: Multipart) -> Intake {
    let mut items = Vec::new();
    let mut skipped = 0usize;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) if items.is_empty() && e.status() != StatusCode::PAYLOAD_TOO_LARGE => {
                debug!("Multipart stream ended early before any file: {}", e);
                break;
            }
            Err(e) => {
                warn!("Multipart stream failed after {} files: {}", items.len(), e);
                return Intake::broken(&e);
            }
        };

        let field_name = field.name().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let data = match field.bytes().await {
            Ok(data) => data,
            Err(e) => {
                warn!("Could not read multipart part {:?}: {}", file_name, e);
                return Intake::broken(&e);
            }
        };

        match accept_part(field_name.as_deref(), file_name.as_deref(), data) {
            Some(item) => items.push(item),
            None => skipped += 1,
        }
    }

    debug!("Intake accepted {} files, skipped {} parts", items.len(), skipped);
    Intake::Files(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_only_non_empty_file_parts() {
        let data = Bytes::from_static(b"img");
        assert!(accept_part(Some("files"), Some("a.jpg"), data.clone()).is_some());
        assert!(accept_part(Some("other"), Some("a.jpg"), data.clone()).is_none());
        assert!(accept_part(None, Some("a.jpg"), data).is_none());
        assert!(accept_part(Some("files"), Some("a.jpg"), Bytes::new()).is_none());
    }

    #[test]
    fn missing_file_name_becomes_unknown() {
        let item = accept_part(Some("files"), None, Bytes::from_static(b"1234"));
        assert!(matches!(item, Some(ref i) if i.name == "unknown" && i.size == 4));
    }
}
