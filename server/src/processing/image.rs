use anyhow::{Context, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use bytes::Bytes;

use crate::error::AppError;
use crate::media_ingestion::validation::FALLBACK_MIME_TYPE;
use crate::request_counter::RequestCounter;
use super::gemini::{GeminiClient, GenerateContentRequest, InlineData};

/// Raw image bytes returned by the provider, with the MIME type it declared.
#[derive(Debug, Clone)]
pub struct EditedImage {
    pub content_type: String,
    pub data: Bytes,
}

pub struct ImageEditor {
    gemini_client: Option<GeminiClient>,
    request_counter: RequestCounter,
}

impl ImageEditor {
    pub fn new(gemini_client: Option<GeminiClient>, request_counter: RequestCounter) -> Self {
        Self {
            gemini_client,
            request_counter,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.gemini_client.is_some()
    }

    /// Sends the image and instruction to the provider and returns the first
    /// inline image of its first candidate. The call is made once, never
    /// retried.
    pub async fn edit_image(
        &self,
        image_data: &Bytes,
        mime_type: &str,
        instruction: &str,
    ) -> Result<EditedImage, AppError> {
        let client = self.gemini_client.as_ref().ok_or_else(|| {
            AppError::MissingConfiguration("GEMINI_API_KEY is not configured".to_string())
        })?;

        let request = GenerateContentRequest::image_edit(mime_type, BASE64.encode(image_data), instruction);

        self.request_counter.log_edit_request(client.model(), instruction);

        let response = client.generate_content(&request).await.map_err(|e| {
            tracing::error!("Gemini image edit failed: {:#}", e);
            AppError::from(e)
        })?;

        let Some(inline) = response.first_inline_image() else {
            tracing::warn!(
                "Gemini returned {} candidate(s) without inline image data",
                response.candidates.len()
            );
            return Err(AppError::NoImageReturned);
        };

        decode_inline_image(inline).map_err(|e| {
            tracing::error!("Failed to decode Gemini image: {:#}", e);
            AppError::from(e)
        })
    }
}

fn decode_inline_image(inline: &InlineData) -> Result<EditedImage> {
    let data = BASE64
        .decode(inline.data.trim())
        .context("Failed to decode image data returned by Gemini")?;

    let content_type = inline
        .mime_type
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(FALLBACK_MIME_TYPE)
        .to_string();

    Ok(EditedImage {
        content_type,
        data: Bytes::from(data),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 4] = [0x89, b'P', b'N', b'G'];

    #[test]
    fn test_decode_inline_image_defaults_mime_type() {
        let inline = InlineData {
            mime_type: None,
            data: BASE64.encode(PNG_SIGNATURE),
        };

        let image = decode_inline_image(&inline).unwrap();
        assert_eq!(image.content_type, "image/png");
        assert_eq!(image.data.as_ref(), &PNG_SIGNATURE);
    }

    #[test]
    fn test_decode_inline_image_rejects_garbage() {
        let inline = InlineData {
            mime_type: Some("image/png".to_string()),
            data: "not base64!!".to_string(),
        };

        assert!(decode_inline_image(&inline).is_err());
    }

    #[tokio::test]
    async fn test_edit_without_client_is_missing_configuration() {
        let editor = ImageEditor::new(None, RequestCounter::new());
        assert!(!editor.is_configured());

        let err = editor
            .edit_image(&Bytes::from_static(&PNG_SIGNATURE), "image/png", "Add a hat")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::MissingConfiguration(_)));
    }
}
