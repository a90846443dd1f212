//! Camera backend driving a capture device through the `ffmpeg` executable.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use shutterlink_core::{CameraConfig, Facing, FlashMode, MediaKind, MediaRef};

use crate::{CameraBackend, CaptureError, RecordingHandle};

#[cfg(target_os = "linux")]
const INPUT_FORMAT: &str = "v4l2";
#[cfg(target_os = "macos")]
const INPUT_FORMAT: &str = "avfoundation";
#[cfg(windows)]
const INPUT_FORMAT: &str = "dshow";
#[cfg(not(any(target_os = "linux", target_os = "macos", windows)))]
const INPUT_FORMAT: &str = "v4l2";

/// Device and output settings for [`FfmpegCameraBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfmpegCameraSettings {
    /// `ffmpeg` program name or path.
    pub program: String,
    /// Device used for [`Facing::Back`].
    pub back_device: String,
    /// Device used for [`Facing::Front`].
    pub front_device: String,
    /// Directory receiving captured files.
    pub output_dir: PathBuf,
}

/// Real camera backend.
///
/// Photos run one blocking `ffmpeg` invocation. Recordings keep the child
/// process alive until [`CameraBackend::stop_recording`] asks it to finish by
/// writing `q` to its stdin.
#[derive(Debug)]
pub struct FfmpegCameraBackend {
    settings: FfmpegCameraSettings,
    recordings: Mutex<HashMap<u64, ActiveRecording>>,
    next_id: AtomicU64,
}

#[derive(Debug)]
struct ActiveRecording {
    child: Child,
    output: PathBuf,
}

impl FfmpegCameraBackend {
    /// Creates a backend, creating the output directory if needed.
    ///
    /// # Errors
    /// Returns [`CaptureError::Backend`] when the output directory cannot be
    /// created.
    pub fn new(settings: FfmpegCameraSettings) -> Result<Self, CaptureError> {
        std::fs::create_dir_all(&settings.output_dir).map_err(|error| {
            CaptureError::Backend(format!(
                "cannot create media directory '{}': {error}",
                settings.output_dir.display()
            ))
        })?;

        Ok(Self {
            settings,
            recordings: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        })
    }

    fn device_for(&self, facing: Facing) -> &str {
        match facing {
            Facing::Back => &self.settings.back_device,
            Facing::Front => &self.settings.front_device,
        }
    }

    fn output_path(&self, prefix: &str, extension: &str) -> PathBuf {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default();
        let sequence = self.next_id.load(Ordering::Relaxed);
        self.settings
            .output_dir
            .join(format!("{prefix}_{millis}_{sequence}.{extension}"))
    }

    fn base_command(&self, config: &CameraConfig) -> Command {
        if config.flash != FlashMode::Off {
            tracing::debug!(
                stage = "capture",
                action = "flash",
                flash = ?config.flash,
                "capture device has no controllable flash"
            );
        }

        let mut command = Command::new(&self.settings.program);
        command
            .args(["-hide_banner", "-loglevel", "error", "-y"])
            .args(["-f", INPUT_FORMAT, "-i"])
            .arg(self.device_for(config.facing));
        command
    }
}

impl CameraBackend for FfmpegCameraBackend {
    fn capture_photo(&self, config: &CameraConfig) -> Result<MediaRef, CaptureError> {
        let output = self.output_path("IMG", "jpg");
        self.next_id.fetch_add(1, Ordering::Relaxed);

        let result = self
            .base_command(config)
            .args(["-frames:v", "1"])
            .arg(&output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|error| spawn_error(&self.settings.program, error))?;

        if !result.status.success() {
            return Err(CaptureError::Backend(format!(
                "photo capture exited with {}: {}",
                result.status,
                String::from_utf8_lossy(&result.stderr).trim()
            )));
        }

        finished_media(&output, MediaKind::Photo)
    }

    fn start_recording(&self, config: &CameraConfig) -> Result<RecordingHandle, CaptureError> {
        let output = self.output_path("VID", "mp4");
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let child = self
            .base_command(config)
            .args(["-c:v", "libx264", "-pix_fmt", "yuv420p"])
            .arg(&output)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|error| spawn_error(&self.settings.program, error))?;

        let mut recordings = self
            .recordings
            .lock()
            .map_err(|_| CaptureError::Backend("recording table lock poisoned".to_string()))?;
        recordings.insert(id, ActiveRecording { child, output });

        tracing::info!(stage = "capture", action = "start_recording", recording = id, "recording started");
        Ok(RecordingHandle::new(id))
    }

    fn stop_recording(&self, handle: RecordingHandle) -> Result<MediaRef, CaptureError> {
        let ActiveRecording { mut child, output } = self
            .recordings
            .lock()
            .map_err(|_| CaptureError::Backend("recording table lock poisoned".to_string()))?
            .remove(&handle.id())
            .ok_or(CaptureError::UnknownRecording(handle.id()))?;

        // `q` asks ffmpeg to flush and finalize the container.
        if let Some(mut stdin) = child.stdin.take()
            && let Err(error) = stdin.write_all(b"q")
        {
            tracing::warn!(stage = "capture", action = "stop_recording", %error, "graceful stop failed; killing");
            let _ = child.kill();
        }

        let status = child
            .wait()
            .map_err(|error| CaptureError::Backend(format!("recording wait failed: {error}")))?;
        if !status.success() {
            return Err(CaptureError::Backend(format!(
                "recording exited with {status}"
            )));
        }

        tracing::info!(stage = "capture", action = "stop_recording", recording = handle.id(), "recording finished");
        finished_media(&output, MediaKind::Video)
    }
}

fn spawn_error(program: &str, error: std::io::Error) -> CaptureError {
    if error.kind() == std::io::ErrorKind::NotFound {
        CaptureError::DeviceUnavailable(format!("'{program}' is not installed"))
    } else {
        CaptureError::Backend(format!("failed to run '{program}': {error}"))
    }
}

fn finished_media(output: &Path, kind: MediaKind) -> Result<MediaRef, CaptureError> {
    if !output.is_file() {
        return Err(CaptureError::MissingOutput(output.display().to_string()));
    }

    MediaRef::from_path(output, kind).map_err(|error| CaptureError::Backend(error.to_string()))
}

#[cfg(test)]
mod tests {
    //! Unit tests for process-level failure mapping.

    use super::*;

    fn settings(program: &str, dir: &Path) -> FfmpegCameraSettings {
        FfmpegCameraSettings {
            program: program.to_string(),
            back_device: "/dev/video0".to_string(),
            front_device: "/dev/video1".to_string(),
            output_dir: dir.to_path_buf(),
        }
    }

    #[test]
    fn missing_program_reports_unavailable_device() {
        let dir = tempfile::tempdir().expect("temp dir");
        let backend = FfmpegCameraBackend::new(settings("shutterlink-no-such-ffmpeg", dir.path()))
            .expect("backend should build");

        let error = backend
            .capture_photo(&CameraConfig::default())
            .expect_err("capture must fail without ffmpeg");
        assert!(matches!(error, CaptureError::DeviceUnavailable(_)));
    }

    #[test]
    fn stopping_unknown_recording_fails() {
        let dir = tempfile::tempdir().expect("temp dir");
        let backend = FfmpegCameraBackend::new(settings("ffmpeg", dir.path())).expect("backend should build");

        let error = backend
            .stop_recording(RecordingHandle::new(99))
            .expect_err("unknown handle must fail");
        assert!(matches!(error, CaptureError::UnknownRecording(99)));
    }
}
