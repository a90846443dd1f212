#![warn(missing_docs)]
//! # shutterlink-app
//!
//! ## Purpose
//! Orchestrates permissions, capture, preview, and upload for `shutterlink`.
//!
//! ## Responsibilities
//! - Gate the live camera behind camera permission.
//! - Move captured or picked media through the preview stage.
//! - Run the transform and multipart upload on continue.
//! - Load configuration, install logging, and project a status line.
//!
//! ## Data flow
//! Permission gate -> capture surface (camera or library) -> preview stage
//! with local timestamp -> upload pipeline -> capture surface.
//!
//! ## Ownership and lifetimes
//! The controller owns the single view state; media references and recording
//! handles move between view variants and are dropped on retake or after a
//! successful upload.
//!
//! ## Error model
//! Capability failures are caught in [`CaptureWorkflow`], logged, and turned
//! into one [`shutterlink_ui::Notice`] each. Startup failures surface as
//! [`AppError`].
//!
//! ## Security and privacy notes
//! - Only HTTPS upload endpoints are accepted.
//! - Log redaction helpers strip URL credentials, query strings and tokens.

pub mod clock;
pub mod config;
pub mod logging;
pub mod workflow;

use shutterlink_capture::CaptureError;
use shutterlink_permission::{CameraPermission, LibraryPermission};
use shutterlink_ui::ViewState;
use shutterlink_upload::UploadError;
use thiserror::Error;
use url::Url;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{AppConfig, ConfigError};
pub use logging::init_logging;
pub use workflow::{Capabilities, CaptureWorkflow, WorkflowError};

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("SHUTTERLINK_VERSION");

const SECRET_MARKERS: [&str; 6] = [
    "password",
    "token",
    "api_key",
    "signature",
    "authorization",
    "bearer",
];

/// Flat status snapshot for the terminal status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowStatus {
    /// Current screen name.
    pub view: &'static str,
    /// Camera settings, e.g. `back/flash off/photo`.
    pub camera: String,
    /// Camera permission status.
    pub camera_permission: String,
    /// Library permission status.
    pub library_permission: String,
    /// Upload state or the last secure URL.
    pub upload: String,
}

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Projects workflow state into a flat status snapshot.
pub fn project_status(workflow: &CaptureWorkflow) -> WorkflowStatus {
    let camera = workflow.camera_config();
    let upload = match (workflow.view(), workflow.last_upload()) {
        (ViewState::Uploading(_), _) => "in-flight".to_string(),
        (_, Some(receipt)) => format!("last {}", receipt.secure_url),
        (_, None) => "idle".to_string(),
    };

    WorkflowStatus {
        view: workflow.view().name(),
        camera: format!("{:?}/flash {:?}/{:?}", camera.facing, camera.flash, camera.mode)
            .to_ascii_lowercase(),
        camera_permission: camera_permission_label(workflow.permissions().camera()).to_string(),
        library_permission: library_permission_label(workflow.permissions().library()).to_string(),
        upload,
    }
}

fn camera_permission_label(status: CameraPermission) -> &'static str {
    match status {
        CameraPermission::Unknown => "unknown",
        CameraPermission::Granted => "granted",
        CameraPermission::Denied => "denied",
        CameraPermission::DeniedPermanently => "denied-permanently",
    }
}

fn library_permission_label(status: LibraryPermission) -> &'static str {
    match status {
        LibraryPermission::Unknown => "unknown",
        LibraryPermission::Granted => "granted",
        LibraryPermission::Denied => "denied",
    }
}

/// Redacts secrets in log-safe output.
///
/// URLs lose their userinfo and query string; words carrying a secret marker
/// are replaced, and so is the credential following an `authorization` or
/// `bearer` word.
pub fn redact_sensitive(input: &str) -> String {
    let mut redact_next = false;
    let mut words = Vec::new();
    for word in input.split(' ') {
        let lower = word.to_ascii_lowercase();
        let carries_credential = lower.contains("authorization") || lower.contains("bearer");
        if redact_next && !word.is_empty() {
            words.push("<redacted>".to_string());
        } else {
            words.push(redact_word(word));
        }
        redact_next = carries_credential || (redact_next && word.is_empty());
    }
    words.join(" ")
}

fn redact_word(word: &str) -> String {
    if let Ok(mut url) = Url::parse(word)
        && url.has_host()
    {
        if url.username().is_empty() && url.password().is_none() && url.query().is_none() {
            return word.to_string();
        }
        let _ = url.set_username("");
        let _ = url.set_password(None);
        if url.query().is_some() {
            url.set_query(Some("redacted"));
        }
        return url.to_string();
    }

    let lower = word.to_ascii_lowercase();
    for key in SECRET_MARKERS {
        if let Some(position) = lower.find(key) {
            return format!("{}{key}=<redacted>", &word[..position]);
        }
    }
    word.to_string()
}

/// App startup error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration is invalid.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// Camera backend could not be set up.
    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),
    /// Upload pipeline could not be set up.
    #[error("upload error: {0}")]
    Upload(#[from] UploadError),
}
