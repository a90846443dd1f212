#![warn(missing_docs)]
//! # shutterlink-core
//!
//! ## Purpose
//! Defines the pure data model shared across the `shutterlink` workspace.
//!
//! ## Responsibilities
//! - Represent captured media references and their kind tag.
//! - Model live camera settings and their toggle cycles.
//! - Format the preview capture timestamp.
//! - Infer upload filename and MIME type from a media URI.
//!
//! ## Data flow
//! Capture backends emit [`MediaRef`] values -> the preview stage stamps them
//! with [`format_capture_timestamp`] -> the upload pipeline derives
//! [`FileMetadata`] before building the multipart body.
//!
//! ## Ownership and lifetimes
//! Media references own their URI strings so they can move between the
//! capture, preview, and upload stages without borrowing from backends.
//!
//! ## Error model
//! Construction failures (blank URI) return [`CoreError`]. Everything else in
//! this crate is total: toggles and inference always produce a value.
//!
//! ## Example
//! ```rust
//! use shutterlink_core::{FlashMode, MediaKind, infer_file_metadata};
//!
//! assert_eq!(FlashMode::Off.next(), FlashMode::Auto);
//!
//! let metadata = infer_file_metadata("file:///tmp/abc/photo123.heic", MediaKind::Photo);
//! assert_eq!(metadata.filename, "photo123.heic");
//! assert_eq!(metadata.mime_type, "image/heic");
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

/// Length of a formatted capture timestamp (`DD.MM.YY HH:MM:SS`).
pub const CAPTURE_TIMESTAMP_LEN: usize = 17;

/// Fallback upload filename for photos without a discoverable name.
pub const FALLBACK_PHOTO_FILENAME: &str = "photo.jpg";

/// Fallback upload filename for videos without a discoverable name.
pub const FALLBACK_VIDEO_FILENAME: &str = "video.mp4";

/// Fallback MIME type for photos.
pub const FALLBACK_PHOTO_MIME: &str = "image/jpeg";

/// Fallback MIME type for videos.
pub const FALLBACK_VIDEO_MIME: &str = "video/mp4";

const FILE_SCHEME: &str = "file://";

/// Kind tag carried by every captured or picked asset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image.
    #[default]
    Photo,
    /// Video clip.
    Video,
}

impl MediaKind {
    /// Returns the filename used when a URI has no usable last segment.
    pub fn fallback_filename(self) -> &'static str {
        match self {
            MediaKind::Photo => FALLBACK_PHOTO_FILENAME,
            MediaKind::Video => FALLBACK_VIDEO_FILENAME,
        }
    }

    /// Returns the MIME type used when a filename has no extension.
    pub fn fallback_mime(self) -> &'static str {
        match self {
            MediaKind::Photo => FALLBACK_PHOTO_MIME,
            MediaKind::Video => FALLBACK_VIDEO_MIME,
        }
    }

    /// Returns the top-level MIME type (`image` or `video`).
    pub fn mime_top_level(self) -> &'static str {
        match self {
            MediaKind::Photo => "image",
            MediaKind::Video => "video",
        }
    }
}

/// Opaque reference to a locally stored photo or video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    uri: String,
    kind: MediaKind,
}

impl MediaRef {
    /// Constructs a validated media reference.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyUri`] when `uri` is blank.
    pub fn new(uri: impl Into<String>, kind: MediaKind) -> Result<Self, CoreError> {
        let uri = uri.into();
        if uri.trim().is_empty() {
            return Err(CoreError::EmptyUri);
        }

        Ok(Self { uri, kind })
    }

    /// Builds a media reference pointing at a local file path.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyUri`] when the path renders to an empty string.
    pub fn from_path(path: impl Into<PathBuf>, kind: MediaKind) -> Result<Self, CoreError> {
        let path = path.into();
        Self::new(path.to_string_lossy().into_owned(), kind)
    }

    /// Returns the opaque URI string.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Returns the media kind tag.
    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Resolves the URI into a local filesystem path.
    ///
    /// `file://` URIs are stripped to their path; any other value is taken as
    /// a plain path.
    pub fn local_path(&self) -> PathBuf {
        PathBuf::from(self.uri.strip_prefix(FILE_SCHEME).unwrap_or(&self.uri))
    }
}

/// Camera facing direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    /// Rear camera.
    #[default]
    Back,
    /// Front camera.
    Front,
}

impl Facing {
    /// Returns the facing selected by one toggle press.
    pub fn next(self) -> Self {
        match self {
            Facing::Back => Facing::Front,
            Facing::Front => Facing::Back,
        }
    }
}

/// Camera flash mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashMode {
    /// Flash disabled.
    #[default]
    Off,
    /// Flash fires when the scene needs it.
    Auto,
    /// Flash always fires.
    On,
}

impl FlashMode {
    /// Returns the flash mode selected by one toggle press.
    ///
    /// Cycle: `off -> auto -> on -> off`.
    pub fn next(self) -> Self {
        match self {
            FlashMode::Off => FlashMode::Auto,
            FlashMode::Auto => FlashMode::On,
            FlashMode::On => FlashMode::Off,
        }
    }
}

/// Live camera capture mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// Shutter takes still photos.
    #[default]
    Photo,
    /// Shutter starts and stops recordings.
    Video,
}

impl CaptureMode {
    /// Returns the opposite mode.
    pub fn toggled(self) -> Self {
        match self {
            CaptureMode::Photo => CaptureMode::Video,
            CaptureMode::Video => CaptureMode::Photo,
        }
    }

    /// Returns the kind of media this mode produces.
    pub fn media_kind(self) -> MediaKind {
        match self {
            CaptureMode::Photo => MediaKind::Photo,
            CaptureMode::Video => MediaKind::Video,
        }
    }
}

/// Live camera settings. Persists across capture cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Selected camera.
    pub facing: Facing,
    /// Flash behavior.
    pub flash: FlashMode,
    /// Shutter mode.
    pub mode: CaptureMode,
}

impl CameraConfig {
    /// Switches between back and front camera.
    pub fn toggle_facing(&mut self) {
        self.facing = self.facing.next();
    }

    /// Advances flash mode one step along its cycle.
    pub fn cycle_flash(&mut self) {
        self.flash = self.flash.next();
    }

    /// Switches between photo and video mode.
    ///
    /// Callers must not invoke this while a recording is in progress.
    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
    }
}

/// Formats the preview timestamp as `DD.MM.YY HH:MM:SS`.
///
/// The value is rendered in the offset carried by `at`; callers pass local
/// time read once when the preview stage is entered.
pub fn format_capture_timestamp(at: OffsetDateTime) -> String {
    format!(
        "{:02}.{:02}.{:02} {:02}:{:02}:{:02}",
        at.day(),
        at.month() as u8,
        at.year().rem_euclid(100),
        at.hour(),
        at.minute(),
        at.second()
    )
}

/// Upload metadata derived from a media URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Filename sent with the multipart file part.
    pub filename: String,
    /// MIME type sent with the multipart file part.
    pub mime_type: String,
}

/// Infers the upload filename for a media URI.
///
/// The last `/`-separated segment is used when it carries an extension;
/// otherwise the kind-specific fallback (`photo.jpg` / `video.mp4`) applies.
pub fn infer_filename(uri: &str, kind: MediaKind) -> String {
    let segment = uri.rsplit('/').next().unwrap_or_default();
    if file_extension(segment).is_some() {
        segment.to_string()
    } else {
        kind.fallback_filename().to_string()
    }
}

/// Infers the MIME type for an upload filename.
///
/// `image/<ext>` or `video/<ext>` by media kind, with the extension
/// lower-cased; `image/jpeg` / `video/mp4` when there is no extension.
pub fn infer_mime_type(filename: &str, kind: MediaKind) -> String {
    match file_extension(filename) {
        Some(extension) => format!(
            "{}/{}",
            kind.mime_top_level(),
            extension.to_ascii_lowercase()
        ),
        None => kind.fallback_mime().to_string(),
    }
}

/// Infers filename and MIME type in one step.
pub fn infer_file_metadata(uri: &str, kind: MediaKind) -> FileMetadata {
    let filename = infer_filename(uri, kind);
    let mime_type = infer_mime_type(&filename, kind);
    FileMetadata {
        filename,
        mime_type,
    }
}

/// Returns the trailing `.<word>` extension of `name`, if any.
///
/// A word is one or more ASCII alphanumerics or underscores.
fn file_extension(name: &str) -> Option<&str> {
    let (_, extension) = name.rsplit_once('.')?;
    if !extension.is_empty()
        && extension
            .chars()
            .all(|character| character.is_ascii_alphanumeric() || character == '_')
    {
        Some(extension)
    } else {
        None
    }
}

/// Error type for core model validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Media URI was empty or whitespace.
    #[error("media uri is empty")]
    EmptyUri,
}

#[cfg(test)]
mod tests {
    //! Unit tests for toggles and inference helpers.

    use time::macros::datetime;

    use super::*;

    #[test]
    fn facing_toggles_back_and_forth() {
        assert_eq!(Facing::Back.next(), Facing::Front);
        assert_eq!(Facing::Front.next(), Facing::Back);
    }

    #[test]
    fn flash_cycle_returns_to_off_after_three_presses() {
        let mut config = CameraConfig::default();
        for _ in 0..3 {
            config.cycle_flash();
        }
        assert_eq!(config.flash, FlashMode::Off);

        assert_eq!(FlashMode::Off.next(), FlashMode::Auto);
        assert_eq!(FlashMode::Auto.next(), FlashMode::On);
        assert_eq!(FlashMode::On.next(), FlashMode::Off);
    }

    #[test]
    fn timestamp_is_zero_padded() {
        let formatted = format_capture_timestamp(datetime!(2025-01-01 00:00:00 UTC));
        assert_eq!(formatted, "01.01.25 00:00:00");
        assert_eq!(formatted.len(), CAPTURE_TIMESTAMP_LEN);
    }

    #[test]
    fn timestamp_uses_offset_of_input() {
        let formatted = format_capture_timestamp(datetime!(2031-12-09 23:05:07 +07:00));
        assert_eq!(formatted, "09.12.31 23:05:07");
    }

    #[test]
    fn extension_requires_word_characters() {
        assert_eq!(file_extension("clip.mov"), Some("mov"));
        assert_eq!(file_extension("clip."), None);
        assert_eq!(file_extension("clip.m-v"), None);
        assert_eq!(file_extension("12345"), None);
    }

    #[test]
    fn blank_uri_is_rejected() {
        assert_eq!(MediaRef::new("  ", MediaKind::Photo), Err(CoreError::EmptyUri));
    }

    #[test]
    fn file_scheme_is_stripped_for_local_path() {
        let media = MediaRef::new("file:///tmp/a.jpg", MediaKind::Photo).expect("valid uri");
        assert_eq!(media.local_path(), PathBuf::from("/tmp/a.jpg"));
    }
}
