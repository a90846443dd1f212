//! Capture workflow controller.
//!
//! Owns the single [`ViewState`] and drives every capability call in
//! sequence. Each public action takes `&mut self`, so at most one call per
//! operation class can be in flight.

use std::sync::Arc;

use shutterlink_capture::{
    CameraBackend, CaptureError, DialogMediaLibrary, FfmpegCameraBackend, FfmpegCameraSettings,
    MediaLibrary,
};
use shutterlink_core::{CameraConfig, CaptureMode, MediaRef, format_capture_timestamp};
use shutterlink_permission::{
    CameraPermission, CameraRequestOutcome, DevicePermissionGate, PermissionCoordinator,
    PermissionGate, PermissionTracker,
};
use shutterlink_transform::JpegTransform;
use shutterlink_ui::{Notice, PreviewStage, UserAction, ViewState};
use shutterlink_upload::{HttpUploadTransport, UploadError, UploadPipeline, UploadReceipt};
use thiserror::Error;

use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::{AppError, redact_sensitive};

/// Platform capabilities consumed by the workflow.
#[derive(Clone)]
pub struct Capabilities {
    /// Camera and library permission subsystem.
    pub permissions: Arc<dyn PermissionGate>,
    /// Live camera.
    pub camera: Arc<dyn CameraBackend>,
    /// Media library picker.
    pub library: Arc<dyn MediaLibrary>,
    /// Transform + multipart upload pipeline.
    pub upload: UploadPipeline,
    /// Local clock for preview timestamps.
    pub clock: Arc<dyn Clock>,
}

impl Capabilities {
    /// Wires the real desktop capabilities from `config`.
    ///
    /// # Errors
    /// Returns [`AppError`] when the media directory, HTTP client or upload
    /// pipeline cannot be set up.
    pub fn real(config: &AppConfig, clock: SystemClock) -> Result<Self, AppError> {
        let camera = FfmpegCameraBackend::new(FfmpegCameraSettings {
            program: config.ffmpeg.clone(),
            back_device: config.back_camera.clone(),
            front_device: config.front_camera.clone(),
            output_dir: config.media_dir.clone(),
        })?;
        let transport = HttpUploadTransport::new()?;
        let upload = UploadPipeline::new(
            &config.upload_endpoint,
            config.upload_preset.clone(),
            config.transform,
            Arc::new(JpegTransform::new(config.media_dir.clone())),
            Arc::new(transport),
        )?;

        Ok(Self {
            permissions: Arc::new(DevicePermissionGate::new(
                config.camera_devices(),
                config.library_dir.clone(),
            )),
            camera: Arc::new(camera),
            library: Arc::new(DialogMediaLibrary::new(config.library_dir.clone())),
            upload,
            clock: Arc::new(clock),
        })
    }
}

/// Failure of one workflow action.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The action has no control on the current screen or camera mode.
    #[error("'{action}' is not available on the {view} screen")]
    Unavailable {
        /// Rejected action keyword.
        action: &'static str,
        /// Screen name at the time.
        view: &'static str,
    },
    /// Photo capture failed.
    #[error("photo capture failed: {0}")]
    Capture(#[source] CaptureError),
    /// Starting or stopping a recording failed.
    #[error("recording failed: {0}")]
    Recording(#[source] CaptureError),
    /// Library access was refused.
    #[error("library permission refused")]
    LibraryPermissionRequired,
    /// Library picker failed.
    #[error("library pick failed: {0}")]
    Pick(#[source] CaptureError),
    /// Transform, transport or response failure.
    #[error("upload failed: {0}")]
    Upload(#[source] UploadError),
}

impl WorkflowError {
    /// Notice shown for this failure; `None` for silently ignored actions.
    pub fn notice(&self) -> Option<Notice> {
        match self {
            WorkflowError::Unavailable { .. } => None,
            WorkflowError::Capture(_) => Some(Notice::CaptureFailed),
            WorkflowError::Recording(_) => Some(Notice::RecordingFailed),
            WorkflowError::LibraryPermissionRequired => Some(Notice::LibraryPermissionRequired),
            WorkflowError::Pick(_) => Some(Notice::PickFailed),
            WorkflowError::Upload(_) => Some(Notice::UploadFailed),
        }
    }
}

/// Single-screen capture -> preview -> upload controller.
pub struct CaptureWorkflow {
    caps: Capabilities,
    permissions: PermissionCoordinator,
    camera: CameraConfig,
    view: ViewState,
    last_upload: Option<UploadReceipt>,
}

impl CaptureWorkflow {
    /// Starts the workflow: reads camera status and requests library access
    /// once, then shows the screen the camera status allows.
    pub fn start(caps: Capabilities) -> Self {
        let mut permissions = PermissionCoordinator::new(Arc::clone(&caps.permissions));
        permissions.initialize();

        let mut workflow = Self {
            caps,
            permissions,
            camera: CameraConfig::default(),
            view: ViewState::PermissionPending,
            last_upload: None,
        };
        workflow.view = workflow.capture_surface_view();
        tracing::info!(stage = "workflow", action = "start", view = workflow.view.name());
        workflow
    }

    /// Current screen.
    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Current camera settings.
    pub fn camera_config(&self) -> &CameraConfig {
        &self.camera
    }

    /// Tracked permission status.
    pub fn permissions(&self) -> &PermissionTracker {
        self.permissions.tracker()
    }

    /// Receipt of the most recent successful upload.
    pub fn last_upload(&self) -> Option<&UploadReceipt> {
        self.last_upload.as_ref()
    }

    /// Applies one user action and returns the notice to show, if any.
    ///
    /// Actions without a control on the current screen are ignored.
    pub fn dispatch(&mut self, action: UserAction) -> Option<Notice> {
        if !self.view.accepts(action) {
            tracing::debug!(
                stage = "workflow",
                action = action.keyword(),
                view = self.view.name(),
                "action ignored"
            );
            return None;
        }

        let result = match action {
            UserAction::RequestPermission => return self.request_camera_permission(),
            UserAction::CapturePhoto => self.capture_photo(),
            UserAction::StartRecording => self.start_recording(),
            UserAction::StopRecording => self.stop_recording(),
            UserAction::PickFromLibrary => self.pick_from_library(),
            UserAction::ToggleFlash => {
                self.toggle_flash();
                Ok(())
            }
            UserAction::ToggleFacing => {
                self.toggle_facing();
                Ok(())
            }
            UserAction::ToggleMode => {
                self.toggle_mode();
                Ok(())
            }
            UserAction::Retake => {
                self.retake();
                Ok(())
            }
            UserAction::Continue => {
                return match self.continue_upload() {
                    Ok(_) => Some(Notice::UploadSucceeded),
                    Err(error) => self.report(action, error),
                };
            }
            UserAction::Quit => Ok(()),
        };

        match result {
            Ok(()) => None,
            Err(error) => self.report(action, error),
        }
    }

    /// Requests camera access from a permission screen.
    ///
    /// Returns the one-time notice when access is refused permanently.
    pub fn request_camera_permission(&mut self) -> Option<Notice> {
        if !matches!(
            self.view,
            ViewState::PermissionPending | ViewState::PermissionDenied { .. }
        ) {
            return None;
        }

        let outcome = self.permissions.request_camera();
        self.view = self.capture_surface_view();
        match outcome {
            CameraRequestOutcome::DeniedPermanently { notify: true } => {
                Some(Notice::CameraPermanentlyDenied)
            }
            _ => None,
        }
    }

    /// Takes a photo and enters the preview.
    ///
    /// # Errors
    /// [`WorkflowError::Unavailable`] outside photo-mode capturing;
    /// [`WorkflowError::Capture`] when the camera fails (the view stays on
    /// the live camera).
    pub fn capture_photo(&mut self) -> Result<(), WorkflowError> {
        self.require_shutter(UserAction::CapturePhoto, CaptureMode::Photo)?;
        let media = self
            .caps
            .camera
            .capture_photo(&self.camera)
            .map_err(WorkflowError::Capture)?;
        self.enter_preview(media);
        Ok(())
    }

    /// Starts a recording and shows the stop control.
    ///
    /// # Errors
    /// [`WorkflowError::Unavailable`] outside video-mode capturing;
    /// [`WorkflowError::Recording`] when the camera refuses to start.
    pub fn start_recording(&mut self) -> Result<(), WorkflowError> {
        self.require_shutter(UserAction::StartRecording, CaptureMode::Video)?;
        let handle = self
            .caps
            .camera
            .start_recording(&self.camera)
            .map_err(WorkflowError::Recording)?;
        tracing::info!(stage = "capture", action = "start_recording", recording = handle.id());
        self.view = ViewState::Recording(handle);
        Ok(())
    }

    /// Stops the running recording and previews the clip.
    ///
    /// # Errors
    /// [`WorkflowError::Unavailable`] when nothing is recording;
    /// [`WorkflowError::Recording`] when the clip cannot be finalized (the
    /// view returns to the live camera).
    pub fn stop_recording(&mut self) -> Result<(), WorkflowError> {
        let handle = match std::mem::replace(&mut self.view, ViewState::Capturing) {
            ViewState::Recording(handle) => handle,
            other => {
                self.view = other;
                return Err(self.unavailable(UserAction::StopRecording));
            }
        };

        let media = self
            .caps
            .camera
            .stop_recording(handle)
            .map_err(WorkflowError::Recording)?;
        self.enter_preview(media);
        Ok(())
    }

    /// Finalizes a running recording before exit; other views need nothing.
    ///
    /// # Errors
    /// [`WorkflowError::Recording`] when the clip cannot be finalized. The
    /// failure is logged before it is returned.
    pub fn shutdown(&mut self) -> Result<(), WorkflowError> {
        if !self.view.is_recording() {
            return Ok(());
        }
        self.stop_recording().inspect_err(|error| {
            tracing::error!(stage = "workflow", action = "shutdown", %error, "recording not finalized");
        })
    }

    /// Picks an asset from the media library.
    ///
    /// Library access is requested inline when missing. Cancelling the picker
    /// leaves everything untouched.
    ///
    /// # Errors
    /// [`WorkflowError::LibraryPermissionRequired`] when access is refused;
    /// [`WorkflowError::Pick`] when the picker fails.
    pub fn pick_from_library(&mut self) -> Result<(), WorkflowError> {
        if !matches!(self.view, ViewState::Capturing) {
            return Err(self.unavailable(UserAction::PickFromLibrary));
        }
        if !self.permissions.ensure_library() {
            return Err(WorkflowError::LibraryPermissionRequired);
        }

        match self.caps.library.pick().map_err(WorkflowError::Pick)? {
            Some(media) => self.enter_preview(media),
            None => {
                tracing::info!(stage = "capture", action = "pick", "picker cancelled");
            }
        }
        Ok(())
    }

    /// Cycles flash off -> auto -> on. Returns `false` off the camera screen.
    pub fn toggle_flash(&mut self) -> bool {
        if !self.view.is_camera_surface() {
            return false;
        }
        self.camera.cycle_flash();
        true
    }

    /// Switches back/front camera. Returns `false` off the camera screen.
    pub fn toggle_facing(&mut self) -> bool {
        if !self.view.is_camera_surface() {
            return false;
        }
        self.camera.toggle_facing();
        true
    }

    /// Switches photo/video mode. A no-op (returning `false`) while
    /// recording or off the camera screen.
    pub fn toggle_mode(&mut self) -> bool {
        if !matches!(self.view, ViewState::Capturing) {
            return false;
        }
        self.camera.toggle_mode();
        true
    }

    /// Discards the previewed media and returns to the live camera.
    ///
    /// Camera settings persist. Returns `false` when nothing is previewed.
    pub fn retake(&mut self) -> bool {
        if !matches!(self.view, ViewState::Previewing(_) | ViewState::Uploading(_)) {
            return false;
        }
        tracing::info!(stage = "preview", action = "retake", kind = ?self.view.media_kind());
        self.view = self.capture_surface_view();
        true
    }

    /// Moves the previewed media into the uploading screen.
    ///
    /// Returns `false` when nothing is previewed.
    pub fn begin_upload(&mut self) -> bool {
        match std::mem::replace(&mut self.view, ViewState::Capturing) {
            ViewState::Previewing(stage) => {
                tracing::info!(stage = "preview", action = "continue", media = %redact_sensitive(stage.media.uri()));
                self.view = ViewState::Uploading(stage);
                true
            }
            other => {
                self.view = other;
                false
            }
        }
    }

    /// Runs the upload pipeline for the media on the uploading screen.
    ///
    /// On success the session is cleared and the live camera is shown; on
    /// failure the preview returns with the original media and timestamp.
    ///
    /// # Errors
    /// [`WorkflowError::Unavailable`] when no upload was begun;
    /// [`WorkflowError::Upload`] for any pipeline failure.
    pub fn complete_upload(&mut self) -> Result<String, WorkflowError> {
        let stage = match std::mem::replace(&mut self.view, ViewState::Capturing) {
            ViewState::Uploading(stage) => stage,
            other => {
                self.view = other;
                return Err(self.unavailable(UserAction::Continue));
            }
        };

        match self.caps.upload.upload(&stage.media) {
            Ok(receipt) => {
                let secure_url = receipt.secure_url.clone();
                self.last_upload = Some(receipt);
                self.view = self.capture_surface_view();
                Ok(secure_url)
            }
            Err(error) => {
                self.view = ViewState::Previewing(stage);
                Err(WorkflowError::Upload(error))
            }
        }
    }

    /// [`Self::begin_upload`] followed by [`Self::complete_upload`].
    ///
    /// # Errors
    /// Same as [`Self::complete_upload`].
    pub fn continue_upload(&mut self) -> Result<String, WorkflowError> {
        if !self.begin_upload() {
            return Err(self.unavailable(UserAction::Continue));
        }
        self.complete_upload()
    }

    fn enter_preview(&mut self, media: MediaRef) {
        let captured_label = format_capture_timestamp(self.caps.clock.now());
        tracing::info!(
            stage = "capture",
            action = "preview",
            kind = ?media.kind(),
            media = %redact_sensitive(media.uri()),
            captured = %captured_label
        );
        self.view = ViewState::Previewing(PreviewStage {
            media,
            captured_label,
        });
    }

    fn require_shutter(&self, action: UserAction, mode: CaptureMode) -> Result<(), WorkflowError> {
        if matches!(self.view, ViewState::Capturing) && self.camera.mode == mode {
            Ok(())
        } else {
            Err(self.unavailable(action))
        }
    }

    fn unavailable(&self, action: UserAction) -> WorkflowError {
        WorkflowError::Unavailable {
            action: action.keyword(),
            view: self.view.name(),
        }
    }

    fn report(&self, action: UserAction, error: WorkflowError) -> Option<Notice> {
        let notice = error.notice();
        if notice.is_some() {
            tracing::error!(
                stage = "workflow",
                action = action.keyword(),
                view = self.view.name(),
                error = %redact_sensitive(&error.to_string()),
                "action failed"
            );
        } else {
            tracing::debug!(stage = "workflow", action = action.keyword(), %error, "action ignored");
        }
        notice
    }

    fn capture_surface_view(&self) -> ViewState {
        match self.permissions.tracker().camera() {
            CameraPermission::Granted => ViewState::Capturing,
            CameraPermission::Unknown => ViewState::PermissionPending,
            CameraPermission::Denied => ViewState::PermissionDenied { permanent: false },
            CameraPermission::DeniedPermanently => ViewState::PermissionDenied { permanent: true },
        }
    }
}
