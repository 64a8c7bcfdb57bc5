//! Camera access and frame capture.
//!
//! The hardware itself sits behind [`Camera`]; the controller only ever holds
//! one [`CameraHandle`] at a time and must go back through
//! [`Camera::acquire`] after releasing it.

use std::io::Cursor;
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, RgbaImage, imageops};

use crate::error::ClientError;
use crate::selection::SelectedImage;

/// A live video feed.
pub trait VideoStream: Send + Sync {
    /// The frame currently on screen, or `None` if the feed has no data yet.
    fn current_frame(&self) -> Option<RgbaImage>;

    /// Stops the feed and frees the device.
    fn stop(&self);
}

/// Source of video streams, usually a physical webcam.
pub trait Camera: Send + Sync {
    fn acquire(&self) -> anyhow::Result<Arc<dyn VideoStream>>;
}

/// Owns an acquired stream until [`release`](Self::release) or drop.
pub struct CameraHandle {
    stream: Option<Arc<dyn VideoStream>>,
}

impl CameraHandle {
    pub fn acquire(camera: &dyn Camera) -> Result<Self, ClientError> {
        let stream = camera
            .acquire()
            .map_err(|e| ClientError::Camera(format!("{:#}", e)))?;
        tracing::debug!("Camera stream acquired");
        Ok(Self { stream: Some(stream) })
    }

    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    pub fn stream(&self) -> Option<Arc<dyn VideoStream>> {
        self.stream.clone()
    }

    /// Stops the stream. Calling it again is a no-op.
    pub fn release(&mut self) {
        if let Some(stream) = self.stream.take() {
            stream.stop();
            tracing::debug!("Camera stream released");
        }
    }
}

impl Drop for CameraHandle {
    fn drop(&mut self) {
        self.release();
    }
}

/// Grabs the current frame, mirrors it to undo the preview's selfie flip and
/// encodes it as PNG.
pub fn capture_frame(stream: &dyn VideoStream) -> Result<SelectedImage, ClientError> {
    let frame = stream
        .current_frame()
        .ok_or_else(|| ClientError::Capture("the camera has not produced a frame yet".to_string()))?;

    if frame.width() == 0 || frame.height() == 0 {
        return Err(ClientError::Capture("the camera produced an empty frame".to_string()));
    }

    let mirrored = imageops::flip_horizontal(&frame);

    let mut png = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(mirrored)
        .write_to(&mut png, ImageFormat::Png)
        .map_err(|e| ClientError::Capture(e.to_string()))?;

    Ok(SelectedImage::new(
        png.into_inner(),
        "image/png",
        format!("capture-{}.png", chrono::Utc::now().timestamp_millis()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StillStream {
        frame: Option<RgbaImage>,
        stops: AtomicUsize,
    }

    impl VideoStream for StillStream {
        fn current_frame(&self) -> Option<RgbaImage> {
            self.frame.clone()
        }

        fn stop(&self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct StillCamera(Arc<StillStream>);

    impl Camera for StillCamera {
        fn acquire(&self) -> anyhow::Result<Arc<dyn VideoStream>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenCamera;

    impl Camera for BrokenCamera {
        fn acquire(&self) -> anyhow::Result<Arc<dyn VideoStream>> {
            anyhow::bail!("permission denied")
        }
    }

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    fn red_blue_frame() -> RgbaImage {
        let mut frame = RgbaImage::new(2, 1);
        frame.put_pixel(0, 0, RED);
        frame.put_pixel(1, 0, BLUE);
        frame
    }

    #[test]
    fn test_capture_mirrors_frame() {
        let stream = StillStream {
            frame: Some(red_blue_frame()),
            stops: AtomicUsize::new(0),
        };

        let image = capture_frame(&stream).unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert!(image.name.starts_with("capture-") && image.name.ends_with(".png"));

        let decoded = image::load_from_memory_with_format(&image.data, ImageFormat::Png)
            .unwrap()
            .to_rgba8();
        assert_eq!(decoded.get_pixel(0, 0), &BLUE);
        assert_eq!(decoded.get_pixel(1, 0), &RED);
    }

    #[test]
    fn test_capture_without_frame_fails() {
        let stream = StillStream {
            frame: None,
            stops: AtomicUsize::new(0),
        };
        assert!(matches!(capture_frame(&stream), Err(ClientError::Capture(_))));

        let stream = StillStream {
            frame: Some(RgbaImage::new(0, 0)),
            stops: AtomicUsize::new(0),
        };
        assert!(matches!(capture_frame(&stream), Err(ClientError::Capture(_))));
    }

    #[test]
    fn test_release_is_idempotent() {
        let stream = Arc::new(StillStream {
            frame: None,
            stops: AtomicUsize::new(0),
        });
        let camera = StillCamera(stream.clone());

        let mut handle = CameraHandle::acquire(&camera).unwrap();
        assert!(handle.is_active());
        handle.release();
        handle.release();
        assert!(!handle.is_active());
        drop(handle);
        assert_eq!(stream.stops.load(Ordering::SeqCst), 1);

        let handle = CameraHandle::acquire(&camera).unwrap();
        drop(handle);
        assert_eq!(stream.stops.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_acquire_failure_is_reported() {
        let err = CameraHandle::acquire(&BrokenCamera).err().unwrap();
        assert_eq!(err.to_string(), "Camera unavailable: permission denied");
    }
}
