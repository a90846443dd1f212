//! Deterministic synthetic backends for tests and CI.

use std::collections::VecDeque;
use std::sync::Mutex;

use shutterlink_core::{CameraConfig, MediaKind, MediaRef};

use crate::{CameraBackend, CaptureError, MediaLibrary, RecordingHandle};

/// Synthetic camera producing `file:///synthetic/...` references.
#[derive(Debug, Default)]
pub struct SyntheticCameraBackend {
    sequence: Mutex<u64>,
    active_recording: Mutex<Option<u64>>,
    fail_captures: bool,
    fail_finalize: bool,
}

impl SyntheticCameraBackend {
    /// Creates a camera whose captures succeed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a camera whose photo captures and recording starts fail.
    pub fn failing() -> Self {
        Self {
            fail_captures: true,
            ..Self::default()
        }
    }

    /// Creates a camera whose recordings start but never finalize.
    pub fn failing_finalize() -> Self {
        Self {
            fail_finalize: true,
            ..Self::default()
        }
    }

    fn next_sequence(&self) -> Result<u64, CaptureError> {
        let mut sequence = self
            .sequence
            .lock()
            .map_err(|_| CaptureError::Backend("synthetic sequence lock poisoned".to_string()))?;
        *sequence += 1;
        Ok(*sequence)
    }
}

impl CameraBackend for SyntheticCameraBackend {
    fn capture_photo(&self, config: &CameraConfig) -> Result<MediaRef, CaptureError> {
        if self.fail_captures {
            return Err(CaptureError::Backend("synthetic capture failure".to_string()));
        }

        let sequence = self.next_sequence()?;
        let facing = format!("{:?}", config.facing).to_ascii_lowercase();
        MediaRef::new(
            format!("file:///synthetic/{facing}/IMG_{sequence}.jpg"),
            MediaKind::Photo,
        )
        .map_err(|error| CaptureError::Backend(error.to_string()))
    }

    fn start_recording(&self, _config: &CameraConfig) -> Result<RecordingHandle, CaptureError> {
        if self.fail_captures {
            return Err(CaptureError::Backend("synthetic recording failure".to_string()));
        }

        let sequence = self.next_sequence()?;
        let mut active = self
            .active_recording
            .lock()
            .map_err(|_| CaptureError::Backend("synthetic recording lock poisoned".to_string()))?;
        if active.is_some() {
            return Err(CaptureError::Backend("recording already running".to_string()));
        }
        *active = Some(sequence);
        Ok(RecordingHandle::new(sequence))
    }

    fn stop_recording(&self, handle: RecordingHandle) -> Result<MediaRef, CaptureError> {
        let mut active = self
            .active_recording
            .lock()
            .map_err(|_| CaptureError::Backend("synthetic recording lock poisoned".to_string()))?;
        if *active != Some(handle.id()) {
            return Err(CaptureError::UnknownRecording(handle.id()));
        }
        *active = None;
        if self.fail_finalize {
            return Err(CaptureError::Backend("synthetic finalize failure".to_string()));
        }

        MediaRef::new(
            format!("file:///synthetic/VID_{}.mp4", handle.id()),
            MediaKind::Video,
        )
        .map_err(|error| CaptureError::Backend(error.to_string()))
    }
}

/// One scripted picker answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryScript {
    /// User picks this asset.
    Pick(MediaRef),
    /// User closes the picker.
    Cancel,
    /// Picker fails.
    Fail,
}

/// Picker that replays scripted answers; cancels once the script runs out.
#[derive(Debug, Default)]
pub struct SyntheticMediaLibrary {
    script: Mutex<VecDeque<LibraryScript>>,
}

impl SyntheticMediaLibrary {
    /// Creates a picker with the given answers.
    pub fn new(script: Vec<LibraryScript>) -> Self {
        Self {
            script: Mutex::new(script.into()),
        }
    }
}

impl MediaLibrary for SyntheticMediaLibrary {
    fn pick(&self) -> Result<Option<MediaRef>, CaptureError> {
        let next = self
            .script
            .lock()
            .map_err(|_| CaptureError::Library("synthetic script lock poisoned".to_string()))?
            .pop_front()
            .unwrap_or(LibraryScript::Cancel);

        match next {
            LibraryScript::Pick(media) => Ok(Some(media)),
            LibraryScript::Cancel => Ok(None),
            LibraryScript::Fail => Err(CaptureError::Library("synthetic picker failure".to_string())),
        }
    }
}
