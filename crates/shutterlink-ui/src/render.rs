//! Text rendering of screens and notices.

use shutterlink_core::{CameraConfig, CaptureMode, Facing, FlashMode, MediaKind};

use crate::locale::labels;
use crate::{Locale, Notice, UserAction, ViewState};

/// Renders the current screen as terminal text.
///
/// Every control is shown with the keyword that triggers it, e.g.
/// `[photo] Capture`.
pub fn render_view(view: &ViewState, camera: &CameraConfig, locale: Locale) -> String {
    let labels = labels(locale);
    let mut lines = Vec::new();

    match view {
        ViewState::PermissionPending | ViewState::PermissionDenied { .. } => {
            let status = match view {
                ViewState::PermissionDenied { permanent: true } => labels.status_denied_permanently,
                ViewState::PermissionDenied { permanent: false } => labels.status_denied,
                _ => labels.status_pending,
            };
            lines.push(labels.permission_title.to_string());
            lines.push(button(UserAction::RequestPermission, labels.request_button));
            lines.push(status.to_string());
        }
        ViewState::Capturing | ViewState::Recording(_) => {
            let mode = match camera.mode {
                CaptureMode::Photo => format!("📷 {}", labels.mode_photo),
                CaptureMode::Video => format!("🎥 {}", labels.mode_video),
            };
            let mut top = vec![
                button(UserAction::ToggleFlash, &format!("⚡ {}", flash_label(camera.flash))),
                button(UserAction::ToggleFacing, &format!("🔄 {}", facing_label(camera.facing))),
            ];
            if !view.is_recording() {
                top.insert(1, button(UserAction::ToggleMode, &mode));
            }
            lines.push(top.join("   "));

            let shutter = match (view, camera.mode) {
                (ViewState::Recording(_), _) => {
                    format!("{} ● REC", button(UserAction::StopRecording, labels.shutter_stop))
                }
                (_, CaptureMode::Photo) => button(UserAction::CapturePhoto, labels.shutter_photo),
                (_, CaptureMode::Video) => button(UserAction::StartRecording, labels.shutter_record),
            };
            if view.is_recording() {
                lines.push(shutter);
            } else {
                lines.push(format!(
                    "{}   {}",
                    button(UserAction::PickFromLibrary, &format!("📁 {}", labels.library_button)),
                    shutter
                ));
            }
        }
        ViewState::Previewing(stage) => {
            let icon = match stage.media.kind() {
                MediaKind::Photo => "🖼",
                MediaKind::Video => "🎞",
            };
            lines.push(format!("{icon} {}", stage.media.uri()));
            lines.push(stage.captured_label.clone());
            lines.push(format!(
                "{}   {}",
                button(UserAction::Retake, labels.retake_button),
                button(UserAction::Continue, labels.continue_button)
            ));
        }
        ViewState::Uploading(_) => {
            lines.push(format!("⏳ {}", labels.uploading));
        }
    }

    lines.join("\n")
}

/// Renders a notice dialog.
pub fn render_notice(notice: Notice, locale: Locale) -> String {
    let text = notice.text(locale);
    format!(
        "┌ {} ┐\n{}\n[{}]",
        text.title,
        text.message,
        labels(locale).acknowledge
    )
}

fn button(action: UserAction, label: &str) -> String {
    format!("[{}] {label}", action.keyword())
}

fn flash_label(flash: FlashMode) -> &'static str {
    match flash {
        FlashMode::Off => "Off",
        FlashMode::On => "On",
        FlashMode::Auto => "Auto",
    }
}

fn facing_label(facing: Facing) -> &'static str {
    match facing {
        Facing::Back => "back",
        Facing::Front => "front",
    }
}
