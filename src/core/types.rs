//! Core types for conversion batches and their reports.

use std::path::PathBuf;

use bytes::Bytes;
use serde::{Serialize, Serializer};

/// Output target for a derivative image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Desktop,
    Mobile,
}

impl Profile {
    /// Every profile, in archive order.
    pub const ALL: [Profile; 2] = [Profile::Desktop, Profile::Mobile];

    /// Target width in pixels; height follows the source aspect ratio.
    pub fn width(&self) -> u32 {
        match self {
            Self::Desktop => 1000,
            Self::Mobile => 700,
        }
    }

    /// Fixed archive file name inside a batch directory.
    pub fn archive_name(&self) -> &'static str {
        match self {
            Self::Desktop => "desktop_images.zip",
            Self::Mobile => "mobile_images.zip",
        }
    }
}

/// One uploaded file, owned by the request until the pipeline consumes it.
#[derive(Debug, Clone)]
pub struct UploadItem {
    /// Declared file name (`"unknown"` when the client sent none)
    pub name: String,
    /// Raw file contents
    pub bytes: Bytes,
    /// Size of `bytes` in bytes
    pub size: u64,
}

impl UploadItem {
    pub fn new(name: impl Into<String>, bytes: Bytes) -> Self {
        let size = bytes.len() as u64;
        Self {
            name: name.into(),
            bytes,
            size,
        }
    }
}

/// A resized and re-encoded image for one (file, profile) pair.
#[derive(Debug, Clone)]
pub struct Variant {
    pub profile: Profile,
    /// Archive entry name (source name with the extension rewritten)
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Size statistics for one profile of a converted file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileReport {
    /// Encoded size in bytes
    pub size: u64,
    /// Size reduction as a percentage of the original
    #[serde(serialize_with = "two_decimals")]
    pub ratio: f64,
    /// Wall-clock processing time in milliseconds
    #[serde(rename = "time", serialize_with = "two_decimals")]
    pub time_ms: f64,
}

impl ProfileReport {
    pub fn new(original_size: u64, size: u64, time_ms: f64) -> Self {
        Self {
            size,
            ratio: reduction_ratio(original_size, size),
            time_ms,
        }
    }
}

/// Outcome for a single uploaded file.
///
/// Serialized untagged: the success shape carries `originalSize` and both
/// profile reports, the failure shape only `name` and `error`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FileReport {
    Processed {
        name: String,
        #[serde(rename = "originalSize")]
        original_size: u64,
        desktop: ProfileReport,
        mobile: ProfileReport,
    },
    Failed {
        name: String,
        error: String,
    },
}

impl FileReport {
    pub fn failed(name: impl Into<String>, error: impl ToString) -> Self {
        Self::Failed {
            name: name.into(),
            error: error.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Processed { name, .. } | Self::Failed { name, .. } => name,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Processed { .. })
    }
}

/// A written archive and the handle clients use to fetch it.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveBundle {
    pub profile: Profile,
    /// Absolute path of the ZIP file
    pub storage_path: PathBuf,
    /// Retrieval URL encoding `storage_path` and the display file name
    pub download_url: String,
    /// Archive size in bytes
    pub size: u64,
}

/// Body of a successful conversion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub success: bool,
    pub processed_images: Vec<FileReport>,
    pub desktop_zip_url: String,
    pub mobile_zip_url: String,
}

/// Body of a conversion that produced no archives.
#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    pub success: bool,
    pub message: String,
}

/// Response of the conversion operation.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ConvertResponse {
    Completed(BatchSummary),
    Rejected(BatchFailure),
}

impl ConvertResponse {
    pub const NO_FILES: &'static str = "No files uploaded.";

    pub fn completed(processed_images: Vec<FileReport>, desktop_zip_url: String, mobile_zip_url: String) -> Self {
        Self::Completed(BatchSummary {
            success: true,
            processed_images,
            desktop_zip_url,
            mobile_zip_url,
        })
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(BatchFailure {
            success: false,
            message: message.into(),
        })
    }

    pub fn no_files() -> Self {
        Self::rejected(Self::NO_FILES)
    }
}

/// `(1 - new/original) * 100`; zero-sized originals report no reduction.
pub fn reduction_ratio(original_size: u64, new_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    (1.0 - new_size as f64 / original_size as f64) * 100.0
}

fn two_decimals<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{value:.2}"))
}
