//! HTTP error bodies for the retrieval endpoint.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::utils::RetrievalError;

/// Error returned to HTTP clients: a status and a generic message.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    status_code: u16,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<RetrievalError> for ApiError {
    fn from(err: RetrievalError) -> Self {
        let status = match err {
            RetrievalError::MissingParameter => StatusCode::BAD_REQUEST,
            RetrievalError::Forbidden => StatusCode::FORBIDDEN,
            RetrievalError::Unreadable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            status_code: self.status.as_u16(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retrieval_errors_map_to_statuses() {
        assert_eq!(ApiError::from(RetrievalError::MissingParameter).status, StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(RetrievalError::Forbidden).status, StatusCode::FORBIDDEN);
        let unreadable = ApiError::from(RetrievalError::from(std::io::Error::other("/secret/path")));
        assert_eq!(unreadable.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(unreadable.message(), "Could not download file");
    }
}
