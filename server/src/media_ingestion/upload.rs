use std::path::{Path, PathBuf};

use anyhow::Context;
use axum::{
    extract::{Multipart, State, multipart::MultipartRejection},
    response::Json,
};
use bytes::Bytes;
use serde::Serialize;

use crate::{AppState, error::AppError};
use super::form::PhotoForm;
use super::validation::{file_extension, generate_stored_name};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// POST /api/upload (multipart/form-data, field "file")
///
/// Stores the file under `<upload_dir>/<millis>-<uuid>.<ext>` and returns its
/// public path.
pub async fn handle_file_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut form = PhotoForm::read(multipart?, state.config.max_upload_bytes).await?;
    let file = form.require_file()?;

    let extension = file_extension(file.file_name.as_deref());
    let stored_name = generate_stored_name(&extension);

    store_upload(&state.config.upload_dir, &stored_name, &file.data)
        .await
        .map_err(|e| {
            tracing::error!("Failed to store upload {}: {:#}", stored_name, e);
            AppError::Internal("Failed to save file".to_string())
        })?;

    state.request_counter.log_upload(&stored_name, file.data.len());

    Ok(Json(UploadResponse {
        url: format!("{}/{}", state.config.upload_url_prefix, stored_name),
    }))
}

/// Writes `data` to `dir/name` through a hidden `.partial` sibling so that a
/// reader never sees a truncated file under the final name.
pub async fn store_upload(dir: &Path, name: &str, data: &Bytes) -> anyhow::Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create upload directory {}", dir.display()))?;

    let final_path = dir.join(name);
    let partial_path = dir.join(format!(".{}.partial", name));

    let written = async {
        tokio::fs::write(&partial_path, data)
            .await
            .context("Failed to write upload")?;
        tokio::fs::rename(&partial_path, &final_path)
            .await
            .context("Failed to move upload into place")
    }
    .await;

    if let Err(e) = written {
        let _ = tokio::fs::remove_file(&partial_path).await;
        return Err(e);
    }

    Ok(final_path)
}
