//! Client side of the photobooth: picks or captures a photo, chooses an
//! instruction and talks to the photobooth server's upload and edit
//! endpoints.

pub mod api;
pub mod camera;
pub mod controller;
pub mod countdown;
pub mod error;
pub mod presets;
pub mod selection;

pub use api::{BoothApi, UploadReply};
pub use camera::{Camera, CameraHandle, VideoStream};
pub use controller::{PendingRequest, PhotoboothController, SessionPhase};
pub use countdown::Countdown;
pub use error::ClientError;
pub use presets::{PRESETS, Preset, find_preset};
pub use selection::{EditedImage, SelectedImage, SessionResult};
