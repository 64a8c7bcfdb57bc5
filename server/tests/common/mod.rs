#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response},
};
use photobooth_server::{AppState, config::Config, create_router};
use tempfile::TempDir;

pub const BOUNDARY: &str = "photobooth-test-boundary";
pub const PNG_SIGNATURE: [u8; 4] = [0x89, b'P', b'N', b'G'];

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub upload_dir: TempDir,
}

pub fn build_app(api_key: Option<&str>, provider_url: &str) -> TestApp {
    let upload_dir = tempfile::tempdir().expect("create temp upload dir");
    let config = Config::for_dirs(upload_dir.path(), api_key, provider_url);
    build_app_with(config, upload_dir)
}

pub fn build_app_with(config: Config, upload_dir: TempDir) -> TestApp {
    let state = AppState::new(config).expect("build app state");
    TestApp {
        app: create_router(state.clone()),
        state,
        upload_dir,
    }
}

pub enum FormField<'a> {
    File {
        name: &'a str,
        file_name: Option<&'a str>,
        content_type: Option<&'a str>,
        data: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

pub fn file_field<'a>(file_name: &'a str, content_type: &'a str, data: &'a [u8]) -> FormField<'a> {
    FormField::File {
        name: "file",
        file_name: Some(file_name),
        content_type: Some(content_type),
        data,
    }
}

pub fn text_field<'a>(name: &'a str, value: &'a str) -> FormField<'a> {
    FormField::Text { name, value }
}

pub fn multipart_body(fields: &[FormField<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for field in fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match field {
            FormField::File {
                name,
                file_name,
                content_type,
                data,
            } => {
                let disposition = match file_name {
                    Some(file_name) => format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        name, file_name
                    ),
                    None => format!("Content-Disposition: form-data; name=\"{}\"\r\n", name),
                };
                body.extend_from_slice(disposition.as_bytes());
                if let Some(content_type) = content_type {
                    body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
                }
                body.extend_from_slice(b"\r\n");
                body.extend_from_slice(data);
                body.extend_from_slice(b"\r\n");
            }
            FormField::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(uri: &str, fields: &[FormField<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(fields)))
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Number of files in the upload directory, hidden partials included.
pub fn stored_file_count(upload_dir: &TempDir) -> usize {
    match std::fs::read_dir(upload_dir.path()) {
        Ok(entries) => entries.count(),
        Err(_) => 0,
    }
}
