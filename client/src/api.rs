use bytes::Bytes;
use reqwest::{
    StatusCode, header,
    multipart::{Form, Part},
};
use serde::Deserialize;

use crate::error::ClientError;
use crate::selection::{EditedImage, SelectedImage};

const FALLBACK_CONTENT_TYPE: &str = "image/png";

/// Reply of `POST /api/upload`, decoded once at the boundary.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum UploadReply {
    Stored { url: String },
    Failed { error: String },
}

#[derive(Debug, Deserialize)]
struct ErrorReply {
    error: Option<String>,
}

/// HTTP client for the photobooth server's two endpoints.
#[derive(Debug, Clone)]
pub struct BoothApi {
    http_client: reqwest::Client,
    base_url: String,
}

impl BoothApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http_client,
            base_url,
        }
    }

    /// Absolute URL for a server path such as `/uploads/<name>`.
    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    /// Saves the photo on the server and returns its public path.
    pub async fn upload(&self, image: &SelectedImage) -> Result<String, ClientError> {
        let form = Form::new().part("file", file_part(image)?);

        let res = self
            .http_client
            .post(self.resolve("/api/upload"))
            .multipart(form)
            .send()
            .await?;

        let status = res.status();
        let body = res.bytes().await?;

        match serde_json::from_slice::<UploadReply>(&body) {
            Ok(UploadReply::Stored { url }) if status.is_success() => Ok(url),
            Ok(UploadReply::Failed { error }) => Err(ClientError::Server {
                status: status.as_u16(),
                message: error,
            }),
            _ => Err(server_error(status, &body)),
        }
    }

    /// Sends the photo and instruction to the edit endpoint and returns the
    /// edited image bytes.
    pub async fn edit(&self, image: &SelectedImage, instruction: &str) -> Result<EditedImage, ClientError> {
        let form = Form::new()
            .part("file", file_part(image)?)
            .text("instruction", instruction.to_string());

        let res = self
            .http_client
            .post(self.resolve("/api/edit"))
            .multipart(form)
            .send()
            .await?;

        let status = res.status();
        let content_type = res
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string();
        let body = res.bytes().await?;

        if !status.is_success() {
            return Err(server_error(status, &body));
        }

        Ok(EditedImage {
            data: body,
            content_type,
        })
    }

    /// Downloads a previously stored upload.
    pub async fn fetch(&self, path: &str) -> Result<Bytes, ClientError> {
        let res = self.http_client.get(self.resolve(path)).send().await?;
        let status = res.status();
        let body = res.bytes().await?;

        if !status.is_success() {
            return Err(server_error(status, &body));
        }
        Ok(body)
    }
}

fn file_part(image: &SelectedImage) -> Result<Part, ClientError> {
    Ok(Part::bytes(image.data.to_vec())
        .file_name(image.name.clone())
        .mime_str(&image.mime_type)?)
}

/// The `error` field of a JSON error payload, or a generic message when the
/// payload is absent or malformed.
fn server_error(status: StatusCode, body: &[u8]) -> ClientError {
    let message = serde_json::from_slice::<ErrorReply>(body)
        .ok()
        .and_then(|reply| reply.error)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));

    ClientError::Server {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_reply_decoding() {
        let stored: UploadReply = serde_json::from_str(r#"{"url":"/uploads/1-a.png"}"#).unwrap();
        assert_eq!(stored, UploadReply::Stored { url: "/uploads/1-a.png".to_string() });

        let failed: UploadReply = serde_json::from_str(r#"{"error":"Missing file"}"#).unwrap();
        assert_eq!(failed, UploadReply::Failed { error: "Missing file".to_string() });

        assert!(serde_json::from_str::<UploadReply>(r#"{"status":"ok"}"#).is_err());
    }

    #[test]
    fn test_server_error_extracts_message() {
        let err = server_error(StatusCode::BAD_REQUEST, br#"{"error":"Missing instruction"}"#);
        assert_eq!(err.to_string(), "Missing instruction");
        assert!(matches!(err, ClientError::Server { status: 400, .. }));
    }

    #[test]
    fn test_server_error_falls_back_to_generic_message() {
        for body in [&b"<html>Bad Gateway</html>"[..], b"", br#"{"error":null}"#, br#"{"error":"  "}"#] {
            let err = server_error(StatusCode::BAD_GATEWAY, body);
            assert_eq!(err.to_string(), "Request failed with status 502");
        }
    }

    #[test]
    fn test_resolve() {
        let api = BoothApi::new("http://localhost:3000/");
        assert_eq!(api.resolve("/uploads/a.png"), "http://localhost:3000/uploads/a.png");
        assert_eq!(api.resolve("api/edit"), "http://localhost:3000/api/edit");
        assert_eq!(api.resolve("https://cdn.example.com/a.png"), "https://cdn.example.com/a.png");
    }
}
