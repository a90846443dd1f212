//! Media library picker backed by the native file dialog.

use std::path::{Path, PathBuf};

use shutterlink_core::{MediaKind, MediaRef};

use crate::{CaptureError, MediaLibrary};

/// Photo extensions offered by the picker; each must decode in the photo transform.
pub const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp"];
/// Video extensions offered by the picker.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "m4v", "webm", "mkv", "avi", "3gp"];

/// Picks photos and videos through `rfd`, starting in the library directory.
#[derive(Debug, Clone)]
pub struct DialogMediaLibrary {
    library_dir: PathBuf,
}

impl DialogMediaLibrary {
    /// Creates a picker rooted at `library_dir`.
    pub fn new(library_dir: impl Into<PathBuf>) -> Self {
        Self {
            library_dir: library_dir.into(),
        }
    }
}

impl MediaLibrary for DialogMediaLibrary {
    fn pick(&self) -> Result<Option<MediaRef>, CaptureError> {
        let mut all = PHOTO_EXTENSIONS.to_vec();
        all.extend_from_slice(VIDEO_EXTENSIONS);

        let Some(path) = rfd::FileDialog::new()
            .set_title("Choose a photo or video")
            .set_directory(&self.library_dir)
            .add_filter("Photos and videos", all.as_slice())
            .add_filter("Photos", PHOTO_EXTENSIONS)
            .add_filter("Videos", VIDEO_EXTENSIONS)
            .pick_file()
        else {
            return Ok(None);
        };

        if !path.is_file() {
            return Err(CaptureError::Library(format!(
                "selected asset '{}' is not a readable file",
                path.display()
            )));
        }

        let kind = classify_media_path(&path);
        MediaRef::from_path(path, kind)
            .map(Some)
            .map_err(|error| CaptureError::Library(error.to_string()))
    }
}

/// Tags a library asset as video by extension; everything else is a photo.
pub fn classify_media_path(path: &Path) -> MediaKind {
    let is_video = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(extension))
        })
        .unwrap_or(false);

    if is_video {
        MediaKind::Video
    } else {
        MediaKind::Photo
    }
}
