#![warn(missing_docs)]
//! # shutterlink-ui
//!
//! ## Purpose
//! Defines the UI-facing view model for the capture workflow.
//!
//! ## Responsibilities
//! - Represent the current screen as one discriminated [`ViewState`].
//! - Enumerate user actions and which of them each screen accepts.
//! - Provide localized notice text and text rendering of every screen.
//!
//! ## Data flow
//! Controller transitions replace the [`ViewState`] -> [`render_view`]
//! produces the terminal screen -> the user types an action ->
//! [`UserAction::parse`] hands it back to the controller.
//!
//! ## Ownership and lifetimes
//! Capture session data (media reference, recording handle) lives inside the
//! view variants, so it is dropped exactly when its screen is left.
//!
//! ## Error model
//! This crate favors explicit state over recoverable errors. Actions that do
//! not apply to the current screen are filtered by [`ViewState::accepts`].

mod locale;
mod render;

use shutterlink_capture::RecordingHandle;
use shutterlink_core::{MediaKind, MediaRef};

pub use locale::{Locale, Notice, NoticeText, UnknownLocale};
pub use render::{render_notice, render_view};

/// Media shown on the preview stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewStage {
    /// Captured or picked asset.
    pub media: MediaRef,
    /// Timestamp read when the preview stage was entered.
    pub captured_label: String,
}

/// Current screen. Exactly one is active at any time.
#[derive(Debug, PartialEq, Eq)]
pub enum ViewState {
    /// Camera permission not decided yet.
    PermissionPending,
    /// Camera permission refused.
    PermissionDenied {
        /// `true` when the platform will not prompt again.
        permanent: bool,
    },
    /// Live camera, nothing in flight.
    Capturing,
    /// Live camera with a recording running.
    Recording(RecordingHandle),
    /// Asset shown with retake/continue actions.
    Previewing(PreviewStage),
    /// Upload in flight for the previewed asset.
    Uploading(PreviewStage),
}

impl ViewState {
    /// Returns `true` while a recording is running.
    pub fn is_recording(&self) -> bool {
        matches!(self, ViewState::Recording(_))
    }

    /// Returns `true` on the live camera screens.
    pub fn is_camera_surface(&self) -> bool {
        matches!(self, ViewState::Capturing | ViewState::Recording(_))
    }

    /// Returns `true` while an upload is in flight.
    pub fn is_uploading(&self) -> bool {
        matches!(self, ViewState::Uploading(_))
    }

    /// Media held by the current capture session, if any.
    pub fn media(&self) -> Option<&MediaRef> {
        match self {
            ViewState::Previewing(stage) | ViewState::Uploading(stage) => Some(&stage.media),
            _ => None,
        }
    }

    /// Kind of the held media; photo when nothing is held.
    pub fn media_kind(&self) -> MediaKind {
        self.media().map(MediaRef::kind).unwrap_or_default()
    }

    /// Short screen name for logs and status lines.
    pub fn name(&self) -> &'static str {
        match self {
            ViewState::PermissionPending => "permission-pending",
            ViewState::PermissionDenied { .. } => "permission-denied",
            ViewState::Capturing => "capturing",
            ViewState::Recording(_) => "recording",
            ViewState::Previewing(_) => "previewing",
            ViewState::Uploading(_) => "uploading",
        }
    }

    /// Returns `true` when `action` has a control on this screen.
    ///
    /// The camera-mode shutter (photo vs record) is checked by the
    /// controller, which owns the camera settings.
    pub fn accepts(&self, action: UserAction) -> bool {
        use UserAction::*;

        match self {
            ViewState::PermissionPending | ViewState::PermissionDenied { .. } => {
                matches!(action, RequestPermission | Quit)
            }
            ViewState::Capturing => matches!(
                action,
                CapturePhoto
                    | StartRecording
                    | PickFromLibrary
                    | ToggleFlash
                    | ToggleFacing
                    | ToggleMode
                    | Quit
            ),
            ViewState::Recording(_) => {
                matches!(action, StopRecording | ToggleFlash | ToggleFacing | Quit)
            }
            ViewState::Previewing(_) => matches!(action, Retake | Continue | Quit),
            ViewState::Uploading(_) => matches!(action, Retake),
        }
    }
}

/// One user "button press".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserAction {
    /// Ask for camera access.
    RequestPermission,
    /// Take a photo.
    CapturePhoto,
    /// Start a recording.
    StartRecording,
    /// Stop the running recording.
    StopRecording,
    /// Open the media library.
    PickFromLibrary,
    /// Cycle flash mode.
    ToggleFlash,
    /// Switch camera.
    ToggleFacing,
    /// Switch photo/video mode.
    ToggleMode,
    /// Discard the previewed asset.
    Retake,
    /// Upload the previewed asset.
    Continue,
    /// Leave the application.
    Quit,
}

impl UserAction {
    /// Every action, in help order.
    pub const ALL: [UserAction; 11] = [
        UserAction::RequestPermission,
        UserAction::CapturePhoto,
        UserAction::StartRecording,
        UserAction::StopRecording,
        UserAction::PickFromLibrary,
        UserAction::ToggleFlash,
        UserAction::ToggleFacing,
        UserAction::ToggleMode,
        UserAction::Retake,
        UserAction::Continue,
        UserAction::Quit,
    ];

    /// Terminal keyword for this action.
    pub fn keyword(self) -> &'static str {
        match self {
            UserAction::RequestPermission => "request",
            UserAction::CapturePhoto => "photo",
            UserAction::StartRecording => "record",
            UserAction::StopRecording => "stop",
            UserAction::PickFromLibrary => "library",
            UserAction::ToggleFlash => "flash",
            UserAction::ToggleFacing => "flip",
            UserAction::ToggleMode => "mode",
            UserAction::Retake => "retake",
            UserAction::Continue => "continue",
            UserAction::Quit => "quit",
        }
    }

    /// Parses a typed keyword (case-insensitive, surrounding space ignored).
    pub fn parse(input: &str) -> Option<Self> {
        let normalized = input.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|action| action.keyword() == normalized)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for view guards.

    use super::*;

    #[test]
    fn recording_view_rejects_mode_toggle() {
        let view = ViewState::Recording(RecordingHandle::new(1));
        assert!(view.is_recording());
        assert!(!view.accepts(UserAction::ToggleMode));
        assert!(view.accepts(UserAction::StopRecording));
    }

    #[test]
    fn permission_views_only_offer_request() {
        let view = ViewState::PermissionDenied { permanent: true };
        assert!(view.accepts(UserAction::RequestPermission));
        assert!(!view.accepts(UserAction::CapturePhoto));
        assert!(!view.accepts(UserAction::PickFromLibrary));
    }

    #[test]
    fn keywords_round_trip_through_parse() {
        for action in UserAction::ALL {
            assert_eq!(UserAction::parse(action.keyword()), Some(action));
        }
        assert_eq!(UserAction::parse("  PHOTO "), Some(UserAction::CapturePhoto));
        assert_eq!(UserAction::parse("dance"), None);
    }
}
