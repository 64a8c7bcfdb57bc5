use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Failures surfaced by the upload and edit handlers.
///
/// Every variant renders as `{ "error": "<message>" }`; nothing below the
/// handler boundary reaches the caller in any other shape.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    MissingInput(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("File exceeds the maximum allowed size of {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("{0}")]
    MissingConfiguration(String),

    #[error("No image returned from the model")]
    NoImageReturned,

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingInput(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::MissingConfiguration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NoImageReturned => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Maps a multipart read failure, keeping body-limit rejections distinct.
    pub fn from_multipart(err: MultipartError, limit: usize) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge { limit }
        } else {
            AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
        }
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        // `{:#}` keeps the context chain on one line without a backtrace
        AppError::Internal(format!("{:#}", err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.to_string(),
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::MissingInput("Missing file".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::MissingConfiguration("GEMINI_API_KEY is not configured".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(AppError::NoImageReturned.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(AppError::PayloadTooLarge { limit: 1 }.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_anyhow_keeps_context_chain() {
        let err: anyhow::Result<()> = Err(std::io::Error::other("disk full")).context("Failed to write upload");
        let app_err = AppError::from(err.unwrap_err());
        assert_eq!(app_err.to_string(), "Failed to write upload: disk full");
        assert_eq!(app_err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
