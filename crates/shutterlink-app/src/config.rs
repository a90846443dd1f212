//! Environment-driven application configuration.

use std::path::PathBuf;

use shutterlink_transform::{DEFAULT_JPEG_QUALITY, DEFAULT_MAX_WIDTH, TransformOptions};
use shutterlink_ui::Locale;
use shutterlink_upload::{DEFAULT_UPLOAD_ENDPOINT, DEFAULT_UPLOAD_PRESET, validate_upload_endpoint};
use thiserror::Error;

/// Hosting endpoint URL.
pub const ENV_UPLOAD_ENDPOINT: &str = "SHUTTERLINK_UPLOAD_ENDPOINT";
/// Unsigned upload preset.
pub const ENV_UPLOAD_PRESET: &str = "SHUTTERLINK_UPLOAD_PRESET";
/// Maximum photo width.
pub const ENV_MAX_WIDTH: &str = "SHUTTERLINK_MAX_WIDTH";
/// JPEG quality (1..=100).
pub const ENV_JPEG_QUALITY: &str = "SHUTTERLINK_JPEG_QUALITY";
/// Device used for the back camera.
pub const ENV_CAMERA_BACK: &str = "SHUTTERLINK_CAMERA_BACK";
/// Device used for the front camera.
pub const ENV_CAMERA_FRONT: &str = "SHUTTERLINK_CAMERA_FRONT";
/// `ffmpeg` program.
pub const ENV_FFMPEG: &str = "SHUTTERLINK_FFMPEG";
/// Directory the library picker opens in.
pub const ENV_LIBRARY_DIR: &str = "SHUTTERLINK_LIBRARY_DIR";
/// Directory for captured and transformed files.
pub const ENV_MEDIA_DIR: &str = "SHUTTERLINK_MEDIA_DIR";
/// Directory for per-run log files.
pub const ENV_LOG_DIR: &str = "SHUTTERLINK_LOG_DIR";
/// UI language (`en` or `vi`).
pub const ENV_LOCALE: &str = "SHUTTERLINK_LOCALE";

const DEFAULT_BACK_CAMERA: &str = "/dev/video0";
const DEFAULT_FRONT_CAMERA: &str = "/dev/video1";
const DEFAULT_FFMPEG: &str = "ffmpeg";

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Validated HTTPS upload endpoint.
    pub upload_endpoint: String,
    /// Upload preset form value.
    pub upload_preset: String,
    /// Photo transform parameters.
    pub transform: TransformOptions,
    /// Back camera device.
    pub back_camera: String,
    /// Front camera device.
    pub front_camera: String,
    /// `ffmpeg` program name or path.
    pub ffmpeg: String,
    /// Library picker start directory.
    pub library_dir: PathBuf,
    /// Output directory for captures and transforms.
    pub media_dir: PathBuf,
    /// Directory for per-run logs.
    pub log_dir: PathBuf,
    /// UI language.
    pub locale: Locale,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`; unset or blank keys use defaults.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a value fails validation.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let upload_endpoint = value(ENV_UPLOAD_ENDPOINT).unwrap_or_else(|| DEFAULT_UPLOAD_ENDPOINT.to_string());
        validate_upload_endpoint(&upload_endpoint).map_err(|error| ConfigError::InvalidValue {
            key: ENV_UPLOAD_ENDPOINT,
            reason: error.to_string(),
        })?;

        let max_width = parse_number(ENV_MAX_WIDTH, value(ENV_MAX_WIDTH), DEFAULT_MAX_WIDTH)?;
        let quality = parse_number(ENV_JPEG_QUALITY, value(ENV_JPEG_QUALITY), DEFAULT_JPEG_QUALITY)?;
        let transform = TransformOptions::new(max_width, quality).map_err(|error| {
            ConfigError::InvalidValue {
                key: if max_width == 0 { ENV_MAX_WIDTH } else { ENV_JPEG_QUALITY },
                reason: error.to_string(),
            }
        })?;

        let locale = match value(ENV_LOCALE) {
            Some(raw) => raw.parse().map_err(|error: shutterlink_ui::UnknownLocale| {
                ConfigError::InvalidValue {
                    key: ENV_LOCALE,
                    reason: error.to_string(),
                }
            })?,
            None => Locale::default(),
        };

        let media_dir = value(ENV_MEDIA_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("shutterlink"));
        let log_dir = value(ENV_LOG_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| media_dir.clone());
        let library_dir = value(ENV_LIBRARY_DIR)
            .map(PathBuf::from)
            .or_else(dirs::picture_dir)
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            upload_endpoint,
            upload_preset: value(ENV_UPLOAD_PRESET).unwrap_or_else(|| DEFAULT_UPLOAD_PRESET.to_string()),
            transform,
            back_camera: value(ENV_CAMERA_BACK).unwrap_or_else(|| DEFAULT_BACK_CAMERA.to_string()),
            front_camera: value(ENV_CAMERA_FRONT).unwrap_or_else(|| DEFAULT_FRONT_CAMERA.to_string()),
            ffmpeg: value(ENV_FFMPEG).unwrap_or_else(|| DEFAULT_FFMPEG.to_string()),
            library_dir,
            media_dir,
            log_dir,
            locale,
        })
    }

    /// Camera device nodes probed by the permission gate.
    pub fn camera_devices(&self) -> Vec<PathBuf> {
        let mut devices = vec![PathBuf::from(&self.back_camera)];
        if self.front_camera != self.back_camera {
            devices.push(PathBuf::from(&self.front_camera));
        }
        devices
    }
}

fn parse_number<T: std::str::FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw.trim().parse().map_err(|error: T::Err| ConfigError::InvalidValue {
            key,
            reason: error.to_string(),
        }),
        None => Ok(default),
    }
}

/// Configuration error type.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable holds a value that fails validation.
    #[error("invalid {key}: {reason}")]
    InvalidValue {
        /// Offending variable.
        key: &'static str,
        /// Validation message.
        reason: String,
    },
}
