#![warn(missing_docs)]
//! # shutterlink-permission
//!
//! ## Purpose
//! Implements the permission gate that decides which capture views are
//! reachable.
//!
//! ## Responsibilities
//! - Abstract platform permission calls behind [`PermissionGate`].
//! - Track camera and media-library grant status in [`PermissionTracker`].
//! - Apply the request policy in [`PermissionCoordinator`]: library eagerly at
//!   start, camera lazily on user action, one notice on permanent denial.
//!
//! ## Data flow
//! Workflow start -> [`PermissionCoordinator::initialize`] -> user presses the
//! request button -> [`PermissionCoordinator::request_camera`] -> tracker
//! state drives the permission or capture view.
//!
//! ## Error model
//! Platform failures surface as [`PermissionError`]. The coordinator logs them
//! and leaves tracked state unchanged, so callers never see a failed request
//! as a grant.
//!
//! ## Example
//! ```rust
//! use shutterlink_permission::{CameraPermission, PermissionGrant, PermissionTracker};
//!
//! let mut tracker = PermissionTracker::new();
//! assert_eq!(tracker.camera(), CameraPermission::Unknown);
//!
//! tracker.on_camera_grant(PermissionGrant::granted());
//! assert!(tracker.camera_granted());
//! ```

use std::collections::VecDeque;
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;

/// Raw platform answer to a permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionGrant {
    /// Whether access is granted.
    pub granted: bool,
    /// Whether the platform allows prompting again.
    pub can_ask_again: bool,
}

impl PermissionGrant {
    /// Access granted.
    pub fn granted() -> Self {
        Self {
            granted: true,
            can_ask_again: true,
        }
    }

    /// Access refused; the user can be asked again.
    pub fn denied() -> Self {
        Self {
            granted: false,
            can_ask_again: true,
        }
    }

    /// Access refused with no way to prompt again.
    pub fn denied_permanently() -> Self {
        Self {
            granted: false,
            can_ask_again: false,
        }
    }
}

/// Camera grant status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CameraPermission {
    /// Not decided yet.
    #[default]
    Unknown,
    /// Access granted.
    Granted,
    /// Refused; prompting again is possible.
    Denied,
    /// Refused; the platform will not prompt again.
    DeniedPermanently,
}

impl From<PermissionGrant> for CameraPermission {
    fn from(grant: PermissionGrant) -> Self {
        match (grant.granted, grant.can_ask_again) {
            (true, _) => CameraPermission::Granted,
            (false, true) => CameraPermission::Denied,
            (false, false) => CameraPermission::DeniedPermanently,
        }
    }
}

/// Media-library grant status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LibraryPermission {
    /// Not decided yet.
    #[default]
    Unknown,
    /// Access granted.
    Granted,
    /// Access refused.
    Denied,
}

/// Platform permission subsystem.
pub trait PermissionGate: Send + Sync {
    /// Reads current camera status without prompting.
    fn query_camera(&self) -> Result<CameraPermission, PermissionError>;

    /// Requests camera access, prompting when the platform allows it.
    ///
    /// Must return immediately with the recorded answer when the user has
    /// already decided.
    fn request_camera(&self) -> Result<PermissionGrant, PermissionError>;

    /// Requests media-library access.
    fn request_library(&self) -> Result<PermissionGrant, PermissionError>;
}

/// Result of one camera request as seen by the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraRequestOutcome {
    /// Access is (now) granted.
    Granted,
    /// Refused; the request button stays available.
    Denied,
    /// Refused permanently; `notify` is `true` only the first time.
    DeniedPermanently {
        /// Whether the one-time informational notice should be shown.
        notify: bool,
    },
    /// The platform call failed; state unchanged.
    Failed,
}

/// Tracks permission status with explicit transitions.
#[derive(Debug, Clone, Default)]
pub struct PermissionTracker {
    camera: CameraPermission,
    library: LibraryPermission,
    permanent_denial_notified: bool,
}

impl PermissionTracker {
    /// Creates a tracker with both capabilities unknown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns camera status.
    pub fn camera(&self) -> CameraPermission {
        self.camera
    }

    /// Returns library status.
    pub fn library(&self) -> LibraryPermission {
        self.library
    }

    /// Returns `true` when the camera may be used.
    pub fn camera_granted(&self) -> bool {
        self.camera == CameraPermission::Granted
    }

    /// Returns `true` when the library may be browsed.
    pub fn library_granted(&self) -> bool {
        self.library == LibraryPermission::Granted
    }

    /// Records a status read without prompting.
    pub fn on_camera_query(&mut self, status: CameraPermission) {
        self.camera = status;
    }

    /// Records a camera request answer.
    ///
    /// Permanent denial reports `notify: true` exactly once per tracker.
    pub fn on_camera_grant(&mut self, grant: PermissionGrant) -> CameraRequestOutcome {
        self.camera = grant.into();
        match self.camera {
            CameraPermission::Granted => CameraRequestOutcome::Granted,
            CameraPermission::Denied | CameraPermission::Unknown => CameraRequestOutcome::Denied,
            CameraPermission::DeniedPermanently => {
                let notify = !self.permanent_denial_notified;
                self.permanent_denial_notified = true;
                CameraRequestOutcome::DeniedPermanently { notify }
            }
        }
    }

    /// Records a library request answer.
    pub fn on_library_grant(&mut self, grant: PermissionGrant) {
        self.library = if grant.granted {
            LibraryPermission::Granted
        } else {
            LibraryPermission::Denied
        };
    }
}

/// Applies the request policy on top of a [`PermissionGate`].
#[derive(Clone)]
pub struct PermissionCoordinator {
    gate: Arc<dyn PermissionGate>,
    tracker: PermissionTracker,
}

impl PermissionCoordinator {
    /// Creates a coordinator with unknown permission state.
    pub fn new(gate: Arc<dyn PermissionGate>) -> Self {
        Self {
            gate,
            tracker: PermissionTracker::new(),
        }
    }

    /// Returns tracked status.
    pub fn tracker(&self) -> &PermissionTracker {
        &self.tracker
    }

    /// Reads camera status and requests library access once.
    ///
    /// The library answer is recorded but never blocks the workflow; a failed
    /// call is logged and leaves the library status unknown.
    pub fn initialize(&mut self) {
        match self.gate.query_camera() {
            Ok(status) => self.tracker.on_camera_query(status),
            Err(error) => {
                tracing::warn!(stage = "permission", action = "query_camera", %error, "camera status unavailable");
            }
        }

        match self.gate.request_library() {
            Ok(grant) => {
                self.tracker.on_library_grant(grant);
                tracing::info!(
                    stage = "permission",
                    action = "request_library",
                    granted = grant.granted,
                    "library permission resolved"
                );
            }
            Err(error) => {
                tracing::warn!(stage = "permission", action = "request_library", %error, "library request failed");
            }
        }
    }

    /// Requests camera access unless it is already granted.
    pub fn request_camera(&mut self) -> CameraRequestOutcome {
        if self.tracker.camera_granted() {
            return CameraRequestOutcome::Granted;
        }

        match self.gate.request_camera() {
            Ok(grant) => {
                let outcome = self.tracker.on_camera_grant(grant);
                tracing::info!(
                    stage = "permission",
                    action = "request_camera",
                    outcome = ?outcome,
                    "camera permission resolved"
                );
                outcome
            }
            Err(error) => {
                tracing::error!(stage = "permission", action = "request_camera", %error, "camera request failed");
                CameraRequestOutcome::Failed
            }
        }
    }

    /// Returns `true` when library access is granted, requesting it inline
    /// when it is not.
    pub fn ensure_library(&mut self) -> bool {
        if self.tracker.library_granted() {
            return true;
        }

        match self.gate.request_library() {
            Ok(grant) => {
                self.tracker.on_library_grant(grant);
                grant.granted
            }
            Err(error) => {
                tracing::error!(stage = "permission", action = "request_library", %error, "library request failed");
                false
            }
        }
    }
}

/// Permission gate backed by filesystem access to capture devices and the
/// library directory.
///
/// # Notes
/// A desktop process cannot re-prompt for device access, so an existing but
/// inaccessible device maps to permanent denial. A missing device is an
/// ordinary denial: plugging one in and requesting again can succeed.
#[derive(Debug, Clone)]
pub struct DevicePermissionGate {
    camera_devices: Vec<PathBuf>,
    library_dir: PathBuf,
}

impl DevicePermissionGate {
    /// Creates a gate over the given device nodes and library directory.
    pub fn new(camera_devices: Vec<PathBuf>, library_dir: impl Into<PathBuf>) -> Self {
        Self {
            camera_devices,
            library_dir: library_dir.into(),
        }
    }

    fn probe_camera(&self) -> Result<PermissionGrant, PermissionError> {
        let mut any_inaccessible = false;
        for device in &self.camera_devices {
            match File::open(device) {
                Ok(_) => return Ok(PermissionGrant::granted()),
                Err(error) if error.kind() == ErrorKind::PermissionDenied => {
                    any_inaccessible = true;
                }
                Err(error) if error.kind() == ErrorKind::NotFound => {}
                Err(error) => return Err(platform_error(device, error)),
            }
        }

        if any_inaccessible {
            Ok(PermissionGrant::denied_permanently())
        } else {
            Ok(PermissionGrant::denied())
        }
    }
}

impl PermissionGate for DevicePermissionGate {
    fn query_camera(&self) -> Result<CameraPermission, PermissionError> {
        let grant = self.probe_camera()?;
        // A missing device has not been decided on yet.
        if !grant.granted && grant.can_ask_again {
            return Ok(CameraPermission::Unknown);
        }
        Ok(grant.into())
    }

    fn request_camera(&self) -> Result<PermissionGrant, PermissionError> {
        self.probe_camera()
    }

    fn request_library(&self) -> Result<PermissionGrant, PermissionError> {
        match std::fs::read_dir(&self.library_dir) {
            Ok(_) => Ok(PermissionGrant::granted()),
            Err(error) if error.kind() == ErrorKind::PermissionDenied => {
                Ok(PermissionGrant::denied_permanently())
            }
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(PermissionGrant::denied()),
            Err(error) => Err(platform_error(&self.library_dir, error)),
        }
    }
}

fn platform_error(path: &Path, error: std::io::Error) -> PermissionError {
    PermissionError::Platform(format!("{}: {error}", path.display()))
}

/// Scripted gate for tests and offline runs.
///
/// Camera requests pop answers from a queue; once the queue is empty the last
/// answer repeats, mirroring a platform that remembers the user's decision.
#[derive(Debug)]
pub struct ScriptedPermissionGate {
    initial_camera: CameraPermission,
    camera_answers: Mutex<VecDeque<PermissionGrant>>,
    last_camera_answer: Mutex<PermissionGrant>,
    library_answer: PermissionGrant,
    camera_requests: Mutex<u32>,
}

impl ScriptedPermissionGate {
    /// Creates a gate with unknown camera status and the given answers.
    pub fn new(camera_answers: Vec<PermissionGrant>, library_answer: PermissionGrant) -> Self {
        Self {
            initial_camera: CameraPermission::Unknown,
            camera_answers: Mutex::new(camera_answers.into()),
            last_camera_answer: Mutex::new(PermissionGrant::denied()),
            library_answer,
            camera_requests: Mutex::new(0),
        }
    }

    /// Creates a gate where everything is already granted.
    pub fn all_granted() -> Self {
        Self::new(vec![PermissionGrant::granted()], PermissionGrant::granted())
            .with_initial_camera(CameraPermission::Granted)
    }

    /// Overrides the status reported by `query_camera`.
    pub fn with_initial_camera(mut self, status: CameraPermission) -> Self {
        self.initial_camera = status;
        self
    }

    /// Returns how many camera requests reached the gate.
    pub fn camera_requests(&self) -> u32 {
        self.camera_requests.lock().map(|count| *count).unwrap_or(0)
    }
}

impl Default for ScriptedPermissionGate {
    fn default() -> Self {
        Self::all_granted()
    }
}

impl PermissionGate for ScriptedPermissionGate {
    fn query_camera(&self) -> Result<CameraPermission, PermissionError> {
        Ok(self.initial_camera)
    }

    fn request_camera(&self) -> Result<PermissionGrant, PermissionError> {
        let mut requests = self
            .camera_requests
            .lock()
            .map_err(|_| PermissionError::Platform("request counter lock poisoned".to_string()))?;
        *requests += 1;

        let mut answers = self
            .camera_answers
            .lock()
            .map_err(|_| PermissionError::Platform("answer queue lock poisoned".to_string()))?;
        let mut last = self
            .last_camera_answer
            .lock()
            .map_err(|_| PermissionError::Platform("answer lock poisoned".to_string()))?;
        if let Some(answer) = answers.pop_front() {
            *last = answer;
        }
        Ok(*last)
    }

    fn request_library(&self) -> Result<PermissionGrant, PermissionError> {
        Ok(self.library_answer)
    }
}

/// Errors produced by permission backends.
#[derive(Debug, Error)]
pub enum PermissionError {
    /// The platform call itself failed.
    #[error("permission backend failure: {0}")]
    Platform(String),
}
