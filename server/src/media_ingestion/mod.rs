pub mod form;
pub mod upload;
pub mod validation;

pub use form::{FilePart, PhotoForm};
pub use upload::{UploadResponse, handle_file_upload, store_upload};
