//! HTTP surface: conversion intake, archive retrieval and health.

mod errors;
mod handlers;
mod intake;
mod router;

pub use errors::ApiError;
pub use intake::{FILES_FIELD, Intake, accept_part, read_uploads};
pub use router::{CONVERT_ROUTE, build_router};
