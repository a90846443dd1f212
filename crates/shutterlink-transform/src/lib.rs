#![warn(missing_docs)]
//! # shutterlink-transform
//!
//! ## Purpose
//! Down-scales and recompresses photos before upload.
//!
//! ## Responsibilities
//! - Compute aspect-preserving target dimensions bounded by a maximum width.
//! - Decode, resize, and re-encode a photo as JPEG.
//! - Expose a static transform double for pipeline tests.
//!
//! ## Data flow
//! Preview [`MediaRef`] -> [`ImageTransform::transform`] -> derived
//! [`MediaRef`] in the output directory -> upload metadata inference.
//!
//! ## Error model
//! Decode, encode, and filesystem failures return [`TransformError`].

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use shutterlink_core::{MediaKind, MediaRef};
use thiserror::Error;

/// Maximum upload width in pixels.
pub const DEFAULT_MAX_WIDTH: u32 = 1080;

/// JPEG quality matching a 0.7 compress factor.
pub const DEFAULT_JPEG_QUALITY: u8 = 70;

/// Encoded output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Baseline JPEG.
    #[default]
    Jpeg,
}

impl OutputFormat {
    /// File extension written for this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
        }
    }
}

/// Resize and recompression parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformOptions {
    /// Upper bound on output width.
    pub max_width: u32,
    /// Encoder quality in `1..=100`.
    pub quality: u8,
    /// Output container.
    pub format: OutputFormat,
}

impl TransformOptions {
    /// Creates validated options.
    ///
    /// # Errors
    /// Returns [`TransformError::InvalidOptions`] for a zero width or a
    /// quality outside `1..=100`.
    pub fn new(max_width: u32, quality: u8) -> Result<Self, TransformError> {
        if max_width == 0 {
            return Err(TransformError::InvalidOptions(
                "max width must be greater than zero".to_string(),
            ));
        }
        if !(1..=100).contains(&quality) {
            return Err(TransformError::InvalidOptions(format!(
                "quality must be within 1..=100, got {quality}"
            )));
        }

        Ok(Self {
            max_width,
            quality,
            format: OutputFormat::Jpeg,
        })
    }
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            quality: DEFAULT_JPEG_QUALITY,
            format: OutputFormat::Jpeg,
        }
    }
}

/// Photo transform capability.
pub trait ImageTransform: Send + Sync {
    /// Produces an upload-ready copy of `source`.
    ///
    /// # Errors
    /// Returns [`TransformError`] when the source cannot be decoded or the
    /// output cannot be written.
    fn transform(
        &self,
        source: &MediaRef,
        options: &TransformOptions,
    ) -> Result<MediaRef, TransformError>;
}

/// Computes output dimensions for a `width x height` source.
///
/// Sources no wider than `max_width` keep their size. Wider sources are
/// scaled to `max_width` with height rounded to the nearest pixel (min 1).
pub fn target_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width || width == 0 {
        return (width, height);
    }

    let scaled = (u64::from(height) * u64::from(max_width) + u64::from(width) / 2) / u64::from(width);
    (max_width, scaled.clamp(1, u64::from(u32::MAX)) as u32)
}

/// Real transform writing JPEG files with the `image` crate.
///
/// Outputs are named `{stem}_{sequence}_{max}w.jpg`; the sequence grows with
/// every call so sources sharing a stem never overwrite each other.
#[derive(Debug)]
pub struct JpegTransform {
    output_dir: PathBuf,
    sequence: AtomicU64,
}

impl JpegTransform {
    /// Creates a transform writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            sequence: AtomicU64::new(0),
        }
    }
}

impl ImageTransform for JpegTransform {
    fn transform(
        &self,
        source: &MediaRef,
        options: &TransformOptions,
    ) -> Result<MediaRef, TransformError> {
        let source_path = source.local_path();
        let decoded = image::open(&source_path).map_err(|error| {
            TransformError::Decode(format!("{}: {error}", source_path.display()))
        })?;

        let (width, height) = target_dimensions(decoded.width(), decoded.height(), options.max_width);
        let resized = if (width, height) == (decoded.width(), decoded.height()) {
            decoded
        } else {
            decoded.resize_exact(width, height, FilterType::Triangle)
        };
        let rgb = resized.to_rgb8();

        let stem = source_path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("photo");
        std::fs::create_dir_all(&self.output_dir).map_err(|error| {
            TransformError::Io(format!("{}: {error}", self.output_dir.display()))
        })?;
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let output_path = self.output_dir.join(format!(
            "{stem}_{sequence}_{}w.{}",
            options.max_width,
            options.format.extension()
        ));

        let file = File::create(&output_path)
            .map_err(|error| TransformError::Io(format!("{}: {error}", output_path.display())))?;
        let mut writer = BufWriter::new(file);
        JpegEncoder::new_with_quality(&mut writer, options.quality)
            .encode(&rgb, width, height, image::ColorType::Rgb8.into())
            .map_err(|error| TransformError::Encode(error.to_string()))?;
        writer
            .flush()
            .map_err(|error| TransformError::Io(format!("{}: {error}", output_path.display())))?;

        tracing::debug!(
            stage = "transform",
            action = "encode",
            width,
            height,
            quality = options.quality,
            output = %output_path.display(),
            "photo recompressed"
        );

        MediaRef::from_path(output_path, MediaKind::Photo)
            .map_err(|error| TransformError::Io(error.to_string()))
    }
}

/// Transform double returning a fixed reference and recording its inputs.
#[derive(Debug)]
pub struct StaticTransform {
    output: Option<MediaRef>,
    seen: Mutex<Vec<MediaRef>>,
}

impl StaticTransform {
    /// Returns `output` for every call.
    pub fn returning(output: MediaRef) -> Self {
        Self {
            output: Some(output),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Fails every call.
    pub fn failing() -> Self {
        Self {
            output: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Sources passed to the transform so far.
    pub fn seen(&self) -> Vec<MediaRef> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }
}

impl ImageTransform for StaticTransform {
    fn transform(
        &self,
        source: &MediaRef,
        _options: &TransformOptions,
    ) -> Result<MediaRef, TransformError> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(source.clone());
        }

        self.output
            .clone()
            .ok_or_else(|| TransformError::Decode("static transform failure".to_string()))
    }
}

/// Error type for photo transforms.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Options are out of range.
    #[error("invalid transform options: {0}")]
    InvalidOptions(String),
    /// Source could not be read or decoded.
    #[error("image decode failure: {0}")]
    Decode(String),
    /// Encoder rejected the image.
    #[error("image encode failure: {0}")]
    Encode(String),
    /// Output file could not be written.
    #[error("transform io failure: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    //! Unit tests for resize math and JPEG output.

    use image::{GenericImageView, RgbImage};

    use super::*;

    #[test]
    fn wide_sources_scale_to_max_width() {
        assert_eq!(target_dimensions(4032, 3024, 1080), (1080, 810));
        assert_eq!(target_dimensions(2000, 1, 1080), (1080, 1));
    }

    #[test]
    fn narrow_sources_keep_size() {
        assert_eq!(target_dimensions(720, 1280, 1080), (720, 1280));
        assert_eq!(target_dimensions(1080, 1920, 1080), (1080, 1920));
    }

    #[test]
    fn options_reject_out_of_range_quality() {
        assert!(TransformOptions::new(1080, 0).is_err());
        assert!(TransformOptions::new(0, 70).is_err());
        assert_eq!(TransformOptions::new(1080, 70).expect("valid"), TransformOptions::default());
    }

    #[test]
    fn jpeg_transform_writes_downscaled_jpeg() {
        let dir = tempfile::tempdir().expect("temp dir");
        let source_path = dir.path().join("wide.png");
        RgbImage::from_pixel(40, 20, image::Rgb([200, 10, 10]))
            .save(&source_path)
            .expect("fixture should save");

        let source = MediaRef::from_path(&source_path, MediaKind::Photo).expect("media");
        let options = TransformOptions::new(10, 70).expect("valid options");
        let output = JpegTransform::new(dir.path().join("out"))
            .transform(&source, &options)
            .expect("transform should succeed");

        assert!(output.uri().ends_with("wide_1_10w.jpg"));
        let written = image::open(output.local_path()).expect("output should decode");
        assert_eq!(written.dimensions(), (10, 5));
    }

    #[test]
    fn sources_sharing_a_stem_get_distinct_outputs() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut sources = Vec::new();
        for folder in ["a", "b"] {
            std::fs::create_dir_all(dir.path().join(folder)).expect("folder");
            let path = dir.path().join(folder).join("x.png");
            RgbImage::from_pixel(4, 4, image::Rgb([0, 0, 0]))
                .save(&path)
                .expect("fixture should save");
            sources.push(MediaRef::from_path(&path, MediaKind::Photo).expect("media"));
        }

        let transform = JpegTransform::new(dir.path().join("out"));
        let first = transform
            .transform(&sources[0], &TransformOptions::default())
            .expect("first transform");
        let second = transform
            .transform(&sources[1], &TransformOptions::default())
            .expect("second transform");

        assert_ne!(first.uri(), second.uri());
        assert!(first.local_path().is_file());
        assert!(second.local_path().is_file());
    }

    #[test]
    fn jpeg_transform_reports_missing_source() {
        let dir = tempfile::tempdir().expect("temp dir");
        let source = MediaRef::from_path(dir.path().join("missing.jpg"), MediaKind::Photo)
            .expect("media");
        let error = JpegTransform::new(dir.path())
            .transform(&source, &TransformOptions::default())
            .expect_err("missing file must fail");
        assert!(matches!(error, TransformError::Decode(_)));
    }
}
