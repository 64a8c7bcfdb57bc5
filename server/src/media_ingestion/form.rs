use axum::extract::Multipart;
use bytes::Bytes;

use crate::error::AppError;
use super::validation::validate_file_size;

#[derive(Debug)]
pub struct FilePart {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// The fields both photo endpoints understand. Unknown fields are skipped.
#[derive(Debug, Default)]
pub struct PhotoForm {
    pub file: Option<FilePart>,
    pub instruction: Option<String>,
}

impl PhotoForm {
    pub async fn read(mut multipart: Multipart, max_bytes: usize) -> Result<Self, AppError> {
        let mut form = PhotoForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::from_multipart(e, max_bytes))?
        {
            let name = field.name().unwrap_or("").to_string();

            match name.as_str() {
                "file" => {
                    let file_name = field.file_name().map(|s| s.to_string());
                    let content_type = field.content_type().map(|s| s.to_string());
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::from_multipart(e, max_bytes))?;

                    validate_file_size(&data, max_bytes)
                        .map_err(|_| AppError::PayloadTooLarge { limit: max_bytes })?;

                    form.file = Some(FilePart {
                        file_name,
                        content_type,
                        data,
                    });
                }
                "instruction" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::from_multipart(e, max_bytes))?;
                    form.instruction = Some(text);
                }
                other => {
                    tracing::debug!("Ignoring unexpected multipart field {:?}", other);
                }
            }
        }

        Ok(form)
    }

    pub fn require_file(&mut self) -> Result<FilePart, AppError> {
        self.file
            .take()
            .ok_or_else(|| AppError::MissingInput("Missing file".to_string()))
    }

    /// The instruction, trimmed; blank counts as missing.
    pub fn require_instruction(&mut self) -> Result<String, AppError> {
        self.instruction
            .take()
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| AppError::MissingInput("Missing instruction".to_string()))
    }
}
