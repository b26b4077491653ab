//! Error types for the image converter.
//!
//! Provides a hierarchy of error types using `thiserror` for ergonomic error handling.

use std::io;
use thiserror::Error;

/// Main error type for conversion batches.
///
/// Per-file variants (`Decode`, `Processing`, `Encode`) end up in a failed
/// file report. The remaining variants fail the whole batch.
#[derive(Error, Debug)]
pub enum ConverterError {
    /// Input bytes could not be decoded as an image
    #[error("Decode error: {0}")]
    Decode(String),

    /// Image processing (resize, worker scheduling) failed
    #[error("Processing error: {0}")]
    Processing(String),

    /// Output encoding failed
    #[error("Encode error: {0}")]
    Encode(String),

    /// ZIP archive could not be written
    #[error("Archive error: {0}")]
    Archive(String),

    /// Batch directory or storage root problem
    #[error("Storage error: {0}")]
    Storage(String),

    /// File IO error
    #[error("IO error: {0}")]
    IO(String),

    /// Invalid server configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience result type for converter operations.
pub type ConverterResult<T> = Result<T, ConverterError>;

// Helper methods for error creation
impl ConverterError {
    pub fn decode<T: Into<String>>(msg: T) -> Self {
        Self::Decode(msg.into())
    }

    pub fn processing<T: Into<String>>(msg: T) -> Self {
        Self::Processing(msg.into())
    }

    pub fn encode<T: Into<String>>(msg: T) -> Self {
        Self::Encode(msg.into())
    }

    pub fn archive<T: Into<String>>(msg: T) -> Self {
        Self::Archive(msg.into())
    }

    pub fn storage<T: Into<String>>(msg: T) -> Self {
        Self::Storage(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }
}

// Convert std::io::Error to ConverterError
impl From<io::Error> for ConverterError {
    fn from(err: io::Error) -> Self {
        Self::IO(err.to_string())
    }
}

impl From<zip::result::ZipError> for ConverterError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Archive(err.to_string())
    }
}

/// Errors raised while serving a stored archive.
///
/// Display strings are sent to clients, so none of them carry a path.
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// `path` or `filename` query parameter absent or empty
    #[error("Missing file path or file name")]
    MissingParameter,

    /// Requested path resolves outside the storage root
    #[error("Forbidden: Access to this file is not allowed")]
    Forbidden,

    /// File vanished (expired) or could not be read
    #[error("Could not download file")]
    Unreadable {
        #[source]
        source: io::Error,
    },
}

impl From<io::Error> for RetrievalError {
    fn from(source: io::Error) -> Self {
        Self::Unreadable { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retrieval_messages_never_mention_paths() {
        let err = RetrievalError::from(io::Error::new(
            io::ErrorKind::NotFound,
            "/tmp/image-converter/abc/desktop_images.zip",
        ));
        assert_eq!(err.to_string(), "Could not download file");
        assert_eq!(
            RetrievalError::Forbidden.to_string(),
            "Forbidden: Access to this file is not allowed"
        );
    }

    #[test]
    fn io_errors_become_io_variant() {
        let err: ConverterError = io::Error::new(io::ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(err, ConverterError::IO(ref msg) if msg == "denied"));
    }
}
