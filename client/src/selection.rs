use std::path::Path;

use bytes::Bytes;

use crate::error::ClientError;

const FALLBACK_MIME_TYPE: &str = "image/png";

/// The photo the user picked or captured. Replaced wholesale, never edited.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedImage {
    pub data: Bytes,
    pub mime_type: String,
    pub name: String,
}

impl SelectedImage {
    pub fn new(data: impl Into<Bytes>, mime_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
            name: name.into(),
        }
    }

    /// Reads a photo from disk, guessing its MIME type from the extension.
    pub async fn from_path(path: &Path) -> Result<Self, ClientError> {
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".to_string());
        let mime_type = mime_guess::from_path(path)
            .first()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_else(|| FALLBACK_MIME_TYPE.to_string());

        Ok(Self::new(data, mime_type, name))
    }
}

/// Image bytes returned by the edit endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct EditedImage {
    pub data: Bytes,
    pub content_type: String,
}

/// What the session currently shows as its result.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionResult {
    /// Public path of a photo saved through the upload endpoint.
    Stored { url: String },
    Edited(EditedImage),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_from_path_guesses_mime_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portrait.jpeg");
        tokio::fs::write(&path, b"\xFF\xD8\xFF").await.unwrap();

        let image = SelectedImage::from_path(&path).await.unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.name, "portrait.jpeg");
        assert_eq!(image.data.as_ref(), b"\xFF\xD8\xFF");
    }

    #[tokio::test]
    async fn test_from_path_missing_file() {
        let err = SelectedImage::from_path(Path::new("/definitely/not/here.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Io(_)));
    }
}
