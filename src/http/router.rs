//! Router construction.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::commands::DOWNLOAD_ROUTE;
use crate::core::AppState;
use crate::http::handlers::{convert, download, health};

/// Route accepting conversion batches.
pub const CONVERT_ROUTE: &str = "/api/convert";

/// Builds the service router with its shared state.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config().max_upload_bytes;

    Router::new()
        .route(CONVERT_ROUTE, post(convert))
        .route(DOWNLOAD_ROUTE, get(download))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
