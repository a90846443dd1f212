#![warn(missing_docs)]
//! # shutterlink-capture
//!
//! ## Purpose
//! Provides the capture-surface capabilities: live camera capture and media
//! library picking.
//!
//! ## Responsibilities
//! - Define backend-agnostic [`CameraBackend`] and [`MediaLibrary`] traits.
//! - Drive a real camera through the `ffmpeg` executable.
//! - Pick library assets through the native file dialog.
//! - Expose deterministic synthetic backends for CI and tests.
//!
//! ## Data flow
//! Workflow passes the current [`CameraConfig`] -> backend writes the asset to
//! the media directory -> a [`MediaRef`] tagged with its kind goes to the
//! preview stage.
//!
//! ## Ownership and lifetimes
//! A running recording is represented by a [`RecordingHandle`] that is moved
//! into [`CameraBackend::stop_recording`]; it cannot be stopped twice.
//!
//! ## Error model
//! Device, process, and dialog failures are reported as [`CaptureError`].
//! A cancelled pick is `Ok(None)`, not an error.

mod ffmpeg;
mod library;
mod synthetic;

use shutterlink_core::{CameraConfig, MediaRef};
use thiserror::Error;

pub use ffmpeg::{FfmpegCameraBackend, FfmpegCameraSettings};
pub use library::{DialogMediaLibrary, PHOTO_EXTENSIONS, VIDEO_EXTENSIONS, classify_media_path};
pub use synthetic::{LibraryScript, SyntheticCameraBackend, SyntheticMediaLibrary};

/// Token for one in-progress recording.
///
/// Not `Clone`: stopping a recording consumes its handle.
#[derive(Debug, PartialEq, Eq)]
pub struct RecordingHandle {
    id: u64,
}

impl RecordingHandle {
    /// Creates a handle with a backend-assigned id.
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    /// Returns the backend-assigned id.
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Live camera capability.
pub trait CameraBackend: Send + Sync {
    /// Captures one still photo with the given settings.
    ///
    /// # Errors
    /// Returns [`CaptureError`] when the device or encoder fails.
    fn capture_photo(&self, config: &CameraConfig) -> Result<MediaRef, CaptureError>;

    /// Starts a recording and returns as soon as it is running.
    ///
    /// # Errors
    /// Returns [`CaptureError`] when the recording cannot be started.
    fn start_recording(&self, config: &CameraConfig) -> Result<RecordingHandle, CaptureError>;

    /// Stops a recording and returns the finished clip.
    ///
    /// # Errors
    /// Returns [`CaptureError::UnknownRecording`] for a handle this backend
    /// did not issue, or [`CaptureError`] when finalizing fails.
    fn stop_recording(&self, handle: RecordingHandle) -> Result<MediaRef, CaptureError>;
}

/// Media library picker capability.
pub trait MediaLibrary: Send + Sync {
    /// Lets the user choose one asset.
    ///
    /// # Returns
    /// - `Ok(Some(media))` for a chosen asset.
    /// - `Ok(None)` when the user cancelled.
    fn pick(&self) -> Result<Option<MediaRef>, CaptureError>;
}

/// Capture layer error type.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Configured capture device is missing.
    #[error("capture device unavailable: {0}")]
    DeviceUnavailable(String),
    /// Backend process or device failure.
    #[error("capture backend failure: {0}")]
    Backend(String),
    /// Backend reported success but produced no file.
    #[error("capture produced no output at {0}")]
    MissingOutput(String),
    /// Recording handle is not known to this backend.
    #[error("unknown recording: {0}")]
    UnknownRecording(u64),
    /// Library picker failure.
    #[error("media library failure: {0}")]
    Library(String),
}
