//! The photobooth session: one selected photo, one instruction, one result.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::oneshot;

use crate::api::BoothApi;
use crate::camera::{Camera, CameraHandle, capture_frame};
use crate::countdown::Countdown;
use crate::error::ClientError;
use crate::presets::Preset;
use crate::selection::{SelectedImage, SessionResult};

/// Where the session stands, derived from its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Ready,
    Pending,
    ReadyWithResult,
    ReadyWithError,
}

/// Clears the controller's in-flight flag when dropped.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// An outbound call that has been started but not yet sent.
///
/// Owns everything it needs so the controller stays free to render while the
/// request is in flight. Hand the outcome of [`send`](Self::send) back to
/// [`PhotoboothController::complete`]. The controller leaves `Pending` once
/// the request finishes, or as soon as it is dropped unsent or mid-flight.
pub struct PendingRequest {
    api: BoothApi,
    image: SelectedImage,
    instruction: Option<String>,
    _in_flight: InFlight,
}

impl PendingRequest {
    pub async fn send(self) -> Result<SessionResult, ClientError> {
        match self.instruction {
            None => {
                let url = self.api.upload(&self.image).await?;
                Ok(SessionResult::Stored { url })
            }
            Some(instruction) => {
                let edited = self.api.edit(&self.image, &instruction).await?;
                Ok(SessionResult::Edited(edited))
            }
        }
    }
}

type CaptureResult = Result<SelectedImage, ClientError>;

pub struct PhotoboothController {
    api: BoothApi,
    camera: Arc<dyn Camera>,
    camera_handle: Option<CameraHandle>,
    countdown: Option<Countdown>,
    countdown_capture: Option<oneshot::Receiver<CaptureResult>>,
    selected: Option<SelectedImage>,
    instruction: String,
    result: Option<SessionResult>,
    error: Option<String>,
    pending: Arc<AtomicBool>,
}

impl PhotoboothController {
    pub fn new(api: BoothApi, camera: Arc<dyn Camera>) -> Self {
        Self {
            api,
            camera,
            camera_handle: None,
            countdown: None,
            countdown_capture: None,
            selected: None,
            instruction: String::new(),
            result: None,
            error: None,
            pending: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if self.is_pending() {
            SessionPhase::Pending
        } else if self.selected.is_none() {
            SessionPhase::Idle
        } else if self.error.is_some() {
            SessionPhase::ReadyWithError
        } else if self.result.is_some() {
            SessionPhase::ReadyWithResult
        } else {
            SessionPhase::Ready
        }
    }

    pub fn selected(&self) -> Option<&SelectedImage> {
        self.selected.as_ref()
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    /// Whether a save or edit can be triggered right now.
    pub fn can_submit(&self) -> bool {
        !self.is_pending() && self.selected.is_some()
    }

    /// Replaces the current photo and clears any previous result and error.
    pub fn select_image(&mut self, image: SelectedImage) {
        self.selected = Some(image);
        self.result = None;
        self.error = None;
    }

    pub async fn select_file(&mut self, path: &Path) -> Result<(), ClientError> {
        match SelectedImage::from_path(path).await {
            Ok(image) => {
                self.select_image(image);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    pub fn set_instruction(&mut self, instruction: impl Into<String>) {
        self.instruction = instruction.into();
    }

    pub fn apply_preset(&mut self, preset: &Preset) {
        self.instruction = preset.instruction.to_string();
    }

    pub fn camera_active(&self) -> bool {
        self.camera_handle.as_ref().is_some_and(CameraHandle::is_active)
    }

    pub fn start_camera(&mut self) -> Result<(), ClientError> {
        if self.camera_active() {
            return Ok(());
        }
        match CameraHandle::acquire(self.camera.as_ref()) {
            Ok(handle) => {
                self.camera_handle = Some(handle);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Releases the camera and cancels a countdown that would capture from it.
    pub fn stop_camera(&mut self) {
        self.cancel_countdown();
        if let Some(mut handle) = self.camera_handle.take() {
            handle.release();
        }
    }

    /// Turns the camera on or off; returns whether it is now on.
    pub fn toggle_camera(&mut self) -> Result<bool, ClientError> {
        if self.camera_active() {
            self.stop_camera();
            Ok(false)
        } else {
            self.start_camera()?;
            Ok(true)
        }
    }

    /// Captures the current camera frame as the selected photo. On failure
    /// only the error message changes.
    pub fn capture_frame(&mut self) -> Result<(), ClientError> {
        let captured = match self.camera_handle.as_ref().and_then(CameraHandle::stream) {
            Some(stream) => capture_frame(stream.as_ref()),
            None => Err(ClientError::Capture("the camera is not on".to_string())),
        };

        match captured {
            Ok(image) => {
                self.select_image(image);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Starts a countdown that captures a frame when it reaches zero.
    ///
    /// Returns `false` and does nothing while a countdown is running or its
    /// captured frame has not been picked up by
    /// [`settle_countdown`](Self::settle_countdown).
    pub fn run_countdown(&mut self, seconds: u32) -> bool {
        if self.countdown.as_ref().is_some_and(Countdown::is_active) {
            tracing::debug!("Countdown already running; ignoring");
            return false;
        }
        if self.countdown_capture.is_some() {
            tracing::debug!("Previous countdown not settled; ignoring");
            return false;
        }

        let stream = self.camera_handle.as_ref().and_then(CameraHandle::stream);
        let (capture_tx, capture_rx) = oneshot::channel();

        self.countdown = Some(Countdown::start(seconds, move || {
            let captured = match stream {
                Some(stream) => capture_frame(stream.as_ref()),
                None => Err(ClientError::Capture("the camera is not on".to_string())),
            };
            let _ = capture_tx.send(captured);
        }));
        self.countdown_capture = Some(capture_rx);
        true
    }

    /// Seconds left on the running countdown.
    pub fn countdown_remaining(&self) -> Option<u32> {
        self.countdown
            .as_ref()
            .filter(|countdown| countdown.is_active())
            .map(Countdown::remaining)
    }

    pub fn cancel_countdown(&mut self) {
        if let Some(countdown) = self.countdown.take() {
            countdown.cancel();
        }
        self.countdown_capture = None;
    }

    /// Waits for the running countdown and applies the frame it captured.
    ///
    /// Returns `Ok(true)` when a photo was captured, `Ok(false)` when there
    /// was no countdown or it was cancelled.
    pub async fn settle_countdown(&mut self) -> Result<bool, ClientError> {
        let Some(capture_rx) = self.countdown_capture.take() else {
            return Ok(false);
        };

        let outcome = capture_rx.await;
        self.countdown = None;

        match outcome {
            Ok(Ok(image)) => {
                self.select_image(image);
                Ok(true)
            }
            Ok(Err(e)) => Err(self.fail(e)),
            Err(_) => Ok(false),
        }
    }

    /// Starts saving the selected photo through the upload endpoint.
    pub fn begin_save(&mut self) -> Result<PendingRequest, ClientError> {
        self.begin(None)
    }

    /// Starts editing the selected photo with the current instruction.
    pub fn begin_edit(&mut self) -> Result<PendingRequest, ClientError> {
        let instruction = self.instruction.clone();
        self.begin(Some(instruction))
    }

    fn begin(&mut self, instruction: Option<String>) -> Result<PendingRequest, ClientError> {
        if self.is_pending() {
            return Err(ClientError::Busy);
        }
        let Some(image) = self.selected.clone() else {
            return Err(self.fail(ClientError::NoImageSelected));
        };

        self.pending.store(true, Ordering::SeqCst);
        self.error = None;

        Ok(PendingRequest {
            api: self.api.clone(),
            image,
            instruction,
            _in_flight: InFlight(self.pending.clone()),
        })
    }

    /// Records the outcome of a [`PendingRequest`]. Failures keep the
    /// selection and the previous result so the user can retry.
    pub fn complete(&mut self, outcome: Result<SessionResult, ClientError>) -> Result<(), ClientError> {
        self.pending.store(false, Ordering::SeqCst);
        match outcome {
            Ok(result) => {
                self.result = Some(result);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Photobooth request failed: {}", e);
                Err(self.fail(e))
            }
        }
    }

    pub async fn save_locally(&mut self) -> Result<(), ClientError> {
        let request = self.begin_save()?;
        let outcome = request.send().await;
        self.complete(outcome)
    }

    pub async fn edit_with_provider(&mut self) -> Result<(), ClientError> {
        let request = self.begin_edit()?;
        let outcome = request.send().await;
        self.complete(outcome)
    }

    /// Drops the current result.
    pub fn discard_result(&mut self) {
        self.result = None;
    }

    /// Writes the current result to `path`, fetching it first if it only
    /// exists on the server.
    pub async fn save_result(&self, path: impl Into<PathBuf>) -> Result<PathBuf, ClientError> {
        let path = path.into();
        let data = match &self.result {
            Some(SessionResult::Edited(edited)) => edited.data.clone(),
            Some(SessionResult::Stored { url }) => self.api.fetch(url).await?,
            None => return Err(ClientError::NoResult),
        };

        tokio::fs::write(&path, &data).await?;
        Ok(path)
    }

    /// Cancels the countdown and releases the camera.
    pub fn teardown(&mut self) {
        self.stop_camera();
    }

    fn fail(&mut self, err: ClientError) -> ClientError {
        self.error = Some(err.to_string());
        err
    }
}

impl Drop for PhotoboothController {
    fn drop(&mut self) {
        self.teardown();
    }
}
