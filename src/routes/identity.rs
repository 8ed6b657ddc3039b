use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    routing::post,
    Json, Router,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::{ClaimedName, ErrorResponse, UploadForm, UploadResponse};
use crate::utils::upload::{is_allowed_image, INVALID_FORMAT_MESSAGE};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/upload", post(upload))
}

/// Fields of an upload request as they arrive, before validation
#[derive(Default)]
struct UploadParts {
    file_name: Option<String>,
    file: Option<Vec<u8>>,
    first_name: Option<String>,
    last_name: Option<String>,
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "identity",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Best matching name on the document (empty with score 0 if none)", body = UploadResponse),
        (status = 400, description = "Missing field, wrong file type or unreadable image", body = ErrorResponse),
        (status = 413, description = "Upload exceeds the size limit", body = ErrorResponse),
        (status = 503, description = "OCR or NER backend unavailable", body = ErrorResponse)
    )
)]
pub async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut multipart = multipart.map_err(|e| AppError::InvalidInput(e.body_text()))?;
    let mut parts = UploadParts::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                parts.file_name = field.file_name().map(|name| name.to_string());
                parts.file = Some(field.bytes().await?.to_vec());
            }
            "first_name" => parts.first_name = Some(field.text().await?),
            "last_name" => parts.last_name = Some(field.text().await?),
            other => warn!("Ignoring unexpected upload field '{}'", other),
        }
    }

    let Some(file) = parts.file else {
        return Err(AppError::InvalidInput("No file part in the request".to_string()));
    };
    let file_name = parts.file_name.unwrap_or_default();
    if file_name.trim().is_empty() {
        return Err(AppError::InvalidInput("No selected file".to_string()));
    }
    if !is_allowed_image(&file_name) {
        return Err(AppError::InvalidInput(INVALID_FORMAT_MESSAGE.to_string()));
    }

    let first_name = required_text(parts.first_name, "first_name")?;
    let last_name = required_text(parts.last_name, "last_name")?;
    let claimed = ClaimedName::new(first_name, last_name);

    info!("Matching '{}' ({} bytes) against claimed name", file_name, file.len());
    let result = state.identity.extract(&file, &claimed).await?;

    Ok(Json(UploadResponse::from(result)))
}

pub(crate) fn required_text(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput(format!("Missing required field '{}'", field)))
}
