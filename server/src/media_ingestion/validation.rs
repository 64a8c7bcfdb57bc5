use anyhow::{Result, bail};
use bytes::Bytes;
use uuid::Uuid;

pub const FALLBACK_EXTENSION: &str = "png";
pub const FALLBACK_MIME_TYPE: &str = "image/png";
const MAX_EXTENSION_LEN: usize = 10;

pub fn validate_file_size(file_data: &Bytes, max_bytes: usize) -> Result<()> {
    if file_data.len() > max_bytes {
        bail!("File size exceeds maximum allowed size of {} bytes", max_bytes);
    }
    Ok(())
}

/// Lowercased extension of `file_name`, or [`FALLBACK_EXTENSION`] when there
/// is none or it could escape the flat upload directory.
pub fn file_extension(file_name: Option<&str>) -> String {
    let Some((stem, extension)) = file_name.and_then(|name| name.rsplit_once('.')) else {
        return FALLBACK_EXTENSION.to_string();
    };

    let extension = extension.to_lowercase();
    let usable = !stem.is_empty()
        && !extension.is_empty()
        && extension.len() <= MAX_EXTENSION_LEN
        && extension.chars().all(|c| c.is_ascii_alphanumeric());

    if usable {
        extension
    } else {
        FALLBACK_EXTENSION.to_string()
    }
}

/// `<unix-millis>-<uuid-v4>.<ext>`
pub fn generate_stored_name(extension: &str) -> String {
    format!(
        "{}-{}.{}",
        chrono::Utc::now().timestamp_millis(),
        Uuid::new_v4(),
        extension
    )
}

/// MIME type sent upstream: the declared part type, else a guess from the
/// file name, else [`FALLBACK_MIME_TYPE`].
pub fn resolve_mime_type(declared: Option<&str>, file_name: Option<&str>) -> String {
    if let Some(declared) = declared.map(str::trim).filter(|m| !m.is_empty()) {
        return declared.to_lowercase();
    }

    file_name
        .and_then(|name| mime_guess::from_path(name).first())
        .filter(|mime| mime.type_() == mime_guess::mime::IMAGE)
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| FALLBACK_MIME_TYPE.to_string())
}

pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type.starts_with("image/")
}
