// src/processing/libvips/mod.rs

//! Native image processing via libvips-rs.
//!
//! # Architecture
//!
//! - [`executor`]: Decodes one upload and produces every profile's variant.
//! - [`resize`]: Width-driven, aspect-preserving resize.
//! - [`formats`]: The fixed WebP encode policy.
//! - [`runtime`]: One-time libvips initialization.

mod executor;
mod formats;
mod resize;
mod runtime;

pub use executor::{ConvertedFile, convert_upload};
pub use formats::{DERIVATIVE_POLICY, EncodePolicy};
pub use runtime::ensure_vips;
