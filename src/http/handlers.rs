//! Request handlers for the conversion and retrieval endpoints.

use axum::{
    Json,
    extract::{Multipart, Query, State, multipart::MultipartRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{debug, error};

use crate::commands::{convert_batch, fetch_archive};
use crate::core::{AppState, ConvertResponse};
use crate::http::errors::ApiError;
use crate::http::intake::{Intake, read_uploads};

const ZIP_CONTENT_TYPE: &str = "application/zip";

#[derive(Debug, Deserialize)]
pub(crate) struct DownloadQuery {
    pub(crate) path: Option<String>,
    pub(crate) filename: Option<String>,
}

/// `POST /api/convert`
pub(crate) async fn convert(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            debug!("Conversion request is not multipart: {}", rejection);
            return Json(ConvertResponse::no_files()).into_response();
        }
    };

    let items = match read_uploads(multipart).await {
        Intake::Files(items) => items,
        Intake::Broken { status, message } => {
            return (status, Json(ConvertResponse::rejected(message))).into_response();
        }
    };

    match convert_batch(&state, items).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            error!("Conversion batch failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ConvertResponse::rejected("Conversion failed: could not store the converted images.")),
            )
                .into_response()
        }
    }
}

/// `GET /api/download?path=…&filename=…`
pub(crate) async fn download(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    let archive = fetch_archive(
        state.storage(),
        query.path.as_deref(),
        query.filename.as_deref(),
    )
    .await?;

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        header_safe_file_name(&archive.file_name)
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    let length = HeaderValue::from(archive.bytes.len() as u64);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(ZIP_CONTENT_TYPE)),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CONTENT_LENGTH, length),
        ],
        archive.bytes,
    )
        .into_response())
}

/// `GET /health`
pub(crate) async fn health() -> &'static str {
    "ok"
}

/// Replaces characters that would break a quoted header parameter.
fn header_safe_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
