//! HTTP error mapping
//!
//! Snapshot errors surface as 500s with the stable error code and
//! diagnostic message (including parse location for malformed files);
//! invalid query parameters are 400s.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use snapsync_core::SnapError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Snapshot(#[from] SnapError),

    #[error("invalid parameter: {0}")]
    InvalidParam(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Snapshot(err) => {
                tracing::error!(code = err.code(), error = %err, "Snapshot load failed");
                let detail = serde_json::json!({
                    "error": err.code(),
                    "message": err.message(),
                    "path": err.path().map(|p| p.display().to_string()),
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(detail)).into_response()
            }
            ApiError::InvalidParam(message) => {
                let detail = serde_json::json!({
                    "error": "ERR_INVALID_PARAM",
                    "message": message,
                });
                (StatusCode::BAD_REQUEST, Json(detail)).into_response()
            }
        }
    }
}
