/// Everything the controller can report back to the user.
///
/// `Display` renders the text shown next to the action that failed.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Another request is already in progress")]
    Busy,

    #[error("Select or capture a photo first")]
    NoImageSelected,

    #[error("There is no result to save yet")]
    NoResult,

    #[error("Camera unavailable: {0}")]
    Camera(String),

    #[error("Could not capture photo: {0}")]
    Capture(String),

    /// A non-success reply from the photobooth server.
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("File error: {0}")]
    Io(#[from] std::io::Error),
}
