use axum::{
    extract::{Multipart, State, multipart::MultipartRejection},
    http::header,
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    error::AppError,
    media_ingestion::{
        PhotoForm,
        validation::{is_image_mime, resolve_mime_type},
    },
};

/// POST /api/edit (multipart/form-data, fields "file" and "instruction")
///
/// Forwards the photo and instruction to the image model and relays the first
/// image it returns as the raw response body.
pub async fn edit_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let mut form = PhotoForm::read(multipart?, state.config.max_upload_bytes).await?;

    let file = form.require_file()?;
    let instruction = form.require_instruction()?;

    if !state.editor.is_configured() {
        return Err(AppError::MissingConfiguration(
            "GEMINI_API_KEY is not configured".to_string(),
        ));
    }

    let mime_type = resolve_mime_type(file.content_type.as_deref(), file.file_name.as_deref());
    if !is_image_mime(&mime_type) {
        return Err(AppError::UnsupportedMediaType(mime_type));
    }

    tracing::info!(
        mime_type = %mime_type,
        size = file.data.len(),
        instruction_length = instruction.len(),
        "Processing image edit request"
    );

    let edited = state
        .editor
        .edit_image(&file.data, &mime_type, &instruction)
        .await?;

    tracing::info!(
        content_type = %edited.content_type,
        size = edited.data.len(),
        "Image edit completed"
    );

    Ok((
        [
            (header::CONTENT_TYPE, edited.content_type),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
        edited.data,
    )
        .into_response())
}
