//! Shared fixtures for app integration tests.

use std::io::Write;
use std::sync::{Arc, Mutex};

use shutterlink_app::{Capabilities, CaptureWorkflow, FixedClock};
use shutterlink_capture::{LibraryScript, SyntheticCameraBackend, SyntheticMediaLibrary};
use shutterlink_core::{MediaKind, MediaRef};
use shutterlink_permission::ScriptedPermissionGate;
use shutterlink_transform::{StaticTransform, TransformOptions};
use shutterlink_upload::{DEFAULT_UPLOAD_ENDPOINT, DEFAULT_UPLOAD_PRESET, StaticTransport, UploadPipeline};
use time::OffsetDateTime;
use time::macros::datetime;

/// Success body returned by the hosting endpoint double.
#[allow(dead_code)]
pub const SECURE_URL_BODY: &str = r#"{"secure_url":"https://x/y.jpg","public_id":"y"}"#;

/// Recording doubles shared with the workflow under test.
#[allow(dead_code)]
pub struct Doubles {
    /// Permission gate.
    pub gate: Arc<ScriptedPermissionGate>,
    /// Photo transform.
    pub transform: Arc<StaticTransform>,
    /// Upload transport.
    pub transport: Arc<StaticTransport>,
}

/// Builder for a workflow wired to synthetic capabilities.
#[allow(dead_code)]
pub struct WorkflowFixture {
    gate: ScriptedPermissionGate,
    camera: SyntheticCameraBackend,
    library: Vec<LibraryScript>,
    transform: StaticTransform,
    transport: StaticTransport,
    now: OffsetDateTime,
}

#[allow(dead_code)]
impl WorkflowFixture {
    /// Everything granted, captures succeed, uploads answer 200.
    pub fn granted() -> Self {
        Self {
            gate: ScriptedPermissionGate::all_granted(),
            camera: SyntheticCameraBackend::new(),
            library: Vec::new(),
            transform: StaticTransform::returning(derived_photo()),
            transport: StaticTransport::responding(200, SECURE_URL_BODY),
            now: fixed_instant(),
        }
    }

    /// Replaces the permission gate.
    pub fn gate(mut self, gate: ScriptedPermissionGate) -> Self {
        self.gate = gate;
        self
    }

    /// Replaces the camera.
    pub fn camera(mut self, camera: SyntheticCameraBackend) -> Self {
        self.camera = camera;
        self
    }

    /// Scripts the library picker.
    pub fn library(mut self, script: Vec<LibraryScript>) -> Self {
        self.library = script;
        self
    }

    /// Replaces the photo transform.
    pub fn transform(mut self, transform: StaticTransform) -> Self {
        self.transform = transform;
        self
    }

    /// Replaces the upload transport.
    pub fn transport(mut self, transport: StaticTransport) -> Self {
        self.transport = transport;
        self
    }

    /// Freezes the clock at `now`.
    pub fn now(mut self, now: OffsetDateTime) -> Self {
        self.now = now;
        self
    }

    /// Starts the workflow.
    pub fn start(self) -> (CaptureWorkflow, Doubles) {
        let gate = Arc::new(self.gate);
        let transform = Arc::new(self.transform);
        let transport = Arc::new(self.transport);
        let upload = UploadPipeline::new(
            DEFAULT_UPLOAD_ENDPOINT,
            DEFAULT_UPLOAD_PRESET,
            TransformOptions::default(),
            transform.clone(),
            transport.clone(),
        )
        .expect("default pipeline should be valid");

        let caps = Capabilities {
            permissions: gate.clone(),
            camera: Arc::new(self.camera),
            library: Arc::new(SyntheticMediaLibrary::new(self.library)),
            upload,
            clock: Arc::new(FixedClock(self.now)),
        };

        (
            CaptureWorkflow::start(caps),
            Doubles {
                gate,
                transform,
                transport,
            },
        )
    }
}

/// Instant the fixture clock reports by default.
#[allow(dead_code)]
pub fn fixed_instant() -> OffsetDateTime {
    datetime!(2025-01-01 00:00:00 UTC)
}

/// Reference the static transform hands back for photos.
#[allow(dead_code)]
pub fn derived_photo() -> MediaRef {
    MediaRef::new("file:///cache/derived/IMG_1_1080w.jpg", MediaKind::Photo)
        .expect("derived fixture should be valid")
}

/// Asset returned by a scripted library pick.
#[allow(dead_code)]
pub fn library_photo() -> MediaRef {
    MediaRef::new("file:///home/user/Pictures/abc/photo123.webp", MediaKind::Photo)
        .expect("library fixture should be valid")
}

/// In-memory sink for log lines emitted during a test.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

#[allow(dead_code)]
impl LogCapture {
    /// Everything written so far.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("log buffer")).into_owned()
    }
}

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("log buffer").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Runs `run` under a thread-local subscriber and returns its log text.
#[allow(dead_code)]
pub fn capture_logs<T>(run: impl FnOnce() -> T) -> (T, String) {
    let capture = LogCapture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let value = tracing::subscriber::with_default(subscriber, run);
    (value, capture.text())
}
