//! Core application types and state management.
//!
//! This module contains the fundamental types used throughout the application:
//! - [`AppState`]: State shared by every request
//! - [`ServerConfig`]: Environment-driven configuration
//! - [`UploadItem`], [`Variant`], [`FileReport`]: Batch data model
//! - [`ConvertResponse`]: Result of the conversion operation

mod config;
mod state;
mod types;

pub use config::ServerConfig;
pub use state::AppState;
pub use types::{
    ArchiveBundle, BatchFailure, BatchSummary, ConvertResponse, FileReport, Profile,
    ProfileReport, UploadItem, Variant, reduction_ratio,
};
