use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use crate::models::ErrorResponse;
use crate::ner::NerError;
use crate::ocr::OcrError;
use crate::rag::RagError;

/// Errors surfaced to HTTP callers.
///
/// "No name found" and "I don't know" answers are successful responses and
/// never travel through this type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad file type, missing form field, empty question
    #[error("{0}")]
    InvalidInput(String),

    /// The upload is not a readable image
    #[error("{0}")]
    Decode(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    /// OCR, NER, embedding or generation backend failed
    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) | AppError::Decode(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed with {}: {}", status, self);
        } else {
            tracing::debug!("Rejected request with {}: {}", status, self);
        }

        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(err.body_text())
        } else {
            AppError::InvalidInput(err.body_text())
        }
    }
}

impl From<OcrError> for AppError {
    fn from(err: OcrError) -> Self {
        match err {
            OcrError::Decode(_) | OcrError::UnsupportedFormat(_) => AppError::Decode(err.to_string()),
            OcrError::Unavailable(_) | OcrError::Engine(_) => AppError::ServiceUnavailable(err.to_string()),
        }
    }
}

impl From<NerError> for AppError {
    fn from(err: NerError) -> Self {
        AppError::ServiceUnavailable(err.to_string())
    }
}

impl From<RagError> for AppError {
    fn from(err: RagError) -> Self {
        match err {
            RagError::EmptyQuestion => AppError::InvalidInput(err.to_string()),
            RagError::Backend(_) | RagError::InvalidResponse(_) => AppError::ServiceUnavailable(err.to_string()),
            RagError::Load(_) | RagError::EmptyDocument(_) => AppError::Internal(err.to_string()),
        }
    }
}
