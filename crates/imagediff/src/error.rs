use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

use crate::config::ColorParseError;
use crate::diff::DiffError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid multipart form: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Expected 2 form files, got {0}")]
    FileCount(usize),

    #[error("Invalid ignoreColor: {0}")]
    IgnoreColor(#[from] ColorParseError),

    #[error("{0}")]
    Decode(String),

    #[error(transparent)]
    Diff(#[from] DiffError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Multipart(e) => e.status(),
            ApiError::FileCount(_)
            | ApiError::IgnoreColor(_)
            | ApiError::Decode(_)
            | ApiError::Diff(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        warn!(status = status.as_u16(), error = %message, "diff request rejected");

        let body = Json(json!({
            "status": status.as_u16(),
            "error": message,
        }));

        (status, body).into_response()
    }
}
