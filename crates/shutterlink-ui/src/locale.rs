//! Localized notice and label text.

use std::fmt;
use std::str::FromStr;

/// Display language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    /// English.
    #[default]
    English,
    /// Vietnamese.
    Vietnamese,
}

/// Locale tag that is not supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLocale(pub String);

impl fmt::Display for UnknownLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported locale '{}' (expected 'en' or 'vi')", self.0)
    }
}

impl std::error::Error for UnknownLocale {}

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en_us" => Ok(Locale::English),
            "vi" | "vi-vn" | "vi_vn" => Ok(Locale::Vietnamese),
            other => Err(UnknownLocale(other.to_string())),
        }
    }
}

/// Modal, single-acknowledgement message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Camera access refused with no way to prompt again.
    CameraPermanentlyDenied,
    /// Library access is needed for picking.
    LibraryPermissionRequired,
    /// Photo capture failed.
    CaptureFailed,
    /// Recording failed.
    RecordingFailed,
    /// Library pick failed.
    PickFailed,
    /// Upload failed.
    UploadFailed,
    /// Upload succeeded.
    UploadSucceeded,
}

/// Title and body of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoticeText {
    /// Dialog title.
    pub title: &'static str,
    /// Dialog body.
    pub message: &'static str,
}

impl Notice {
    /// Localized text for this notice.
    pub fn text(self, locale: Locale) -> NoticeText {
        let (title, message) = match (locale, self) {
            (Locale::English, Notice::CameraPermanentlyDenied) => (
                "Notice",
                "You denied camera access. Some features may not work.",
            ),
            (Locale::English, Notice::LibraryPermissionRequired) => {
                ("Notice", "Photo library access is required")
            }
            (Locale::English, Notice::CaptureFailed) => ("Error", "Could not take the photo"),
            (Locale::English, Notice::RecordingFailed) => ("Error", "Could not record video"),
            (Locale::English, Notice::PickFailed) => {
                ("Error", "Could not pick from the photo library")
            }
            (Locale::English, Notice::UploadFailed) => ("Failed", "Upload failed! Please try again."),
            (Locale::English, Notice::UploadSucceeded) => ("Success", "Upload succeeded!"),
            (Locale::Vietnamese, Notice::CameraPermanentlyDenied) => (
                "Thông báo",
                "Bạn đã từ chối quyền truy cập camera. Một số tính năng có thể không hoạt động.",
            ),
            (Locale::Vietnamese, Notice::LibraryPermissionRequired) => {
                ("Thông báo", "Cần quyền truy cập thư viện ảnh")
            }
            (Locale::Vietnamese, Notice::CaptureFailed) => ("Lỗi", "Không thể chụp ảnh"),
            (Locale::Vietnamese, Notice::RecordingFailed) => ("Lỗi", "Không thể quay video"),
            (Locale::Vietnamese, Notice::PickFailed) => ("Lỗi", "Không thể chọn ảnh từ thư viện"),
            (Locale::Vietnamese, Notice::UploadFailed) => {
                ("Thất bại", "Upload thất bại! Vui lòng thử lại.")
            }
            (Locale::Vietnamese, Notice::UploadSucceeded) => ("Thành công", "Upload thành công!"),
        };

        NoticeText { title, message }
    }
}

/// Static screen labels.
pub(crate) struct Labels {
    pub permission_title: &'static str,
    pub request_button: &'static str,
    pub status_pending: &'static str,
    pub status_denied: &'static str,
    pub status_denied_permanently: &'static str,
    pub library_button: &'static str,
    pub shutter_photo: &'static str,
    pub shutter_record: &'static str,
    pub shutter_stop: &'static str,
    pub mode_photo: &'static str,
    pub mode_video: &'static str,
    pub retake_button: &'static str,
    pub continue_button: &'static str,
    pub uploading: &'static str,
    pub acknowledge: &'static str,
}

const ENGLISH: Labels = Labels {
    permission_title: "Camera permission required",
    request_button: "REQUEST PERMISSION",
    status_pending: "Status: not granted",
    status_denied: "Status: denied",
    status_denied_permanently: "Status: denied (change it in system settings)",
    library_button: "Library",
    shutter_photo: "Capture",
    shutter_record: "Record",
    shutter_stop: "Stop",
    mode_photo: "Camera",
    mode_video: "Video",
    retake_button: "RETAKE",
    continue_button: "CONTINUE",
    uploading: "Uploading...",
    acknowledge: "OK",
};

const VIETNAMESE: Labels = Labels {
    permission_title: "Yêu cầu quyền Camera",
    request_button: "YÊU CẦU QUYỀN",
    status_pending: "Trạng thái: Chưa cấp quyền",
    status_denied: "Trạng thái: Bị từ chối",
    status_denied_permanently: "Trạng thái: Bị từ chối (thay đổi trong cài đặt)",
    library_button: "Thư viện",
    shutter_photo: "Chụp",
    shutter_record: "Quay",
    shutter_stop: "Dừng",
    mode_photo: "Camera",
    mode_video: "Video",
    retake_button: "CHỤP LẠI",
    continue_button: "TIẾP TỤC",
    uploading: "Đang upload...",
    acknowledge: "OK",
};

pub(crate) fn labels(locale: Locale) -> &'static Labels {
    match locale {
        Locale::English => &ENGLISH,
        Locale::Vietnamese => &VIETNAMESE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_locales() {
        assert_eq!("vi".parse::<Locale>(), Ok(Locale::Vietnamese));
        assert_eq!(" EN ".parse::<Locale>(), Ok(Locale::English));
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn every_notice_has_text_in_every_locale() {
        let notices = [
            Notice::CameraPermanentlyDenied,
            Notice::LibraryPermissionRequired,
            Notice::CaptureFailed,
            Notice::RecordingFailed,
            Notice::PickFailed,
            Notice::UploadFailed,
            Notice::UploadSucceeded,
        ];
        for locale in [Locale::English, Locale::Vietnamese] {
            for notice in notices {
                let text = notice.text(locale);
                assert!(!text.title.is_empty());
                assert!(!text.message.is_empty());
            }
        }
    }
}
