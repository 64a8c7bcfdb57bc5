pub mod gemini;
pub mod image;

pub use gemini::GeminiClient;
pub use image::{EditedImage, ImageEditor};
