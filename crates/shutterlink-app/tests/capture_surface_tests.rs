//! Integration tests for the live camera screen and preview stage.

mod common;

use common::{WorkflowFixture, capture_logs};
use shutterlink_capture::SyntheticCameraBackend;
use shutterlink_core::{CaptureMode, Facing, FlashMode, MediaKind};
use shutterlink_app::WorkflowError;
use shutterlink_ui::{Notice, UserAction, ViewState};
use time::macros::datetime;

#[test]
fn capture_surface_tests_photo_enters_preview_with_clock_timestamp() {
    let (mut workflow, _doubles) = WorkflowFixture::granted()
        .now(datetime!(2024-12-31 23:59:58 +07:00))
        .start();

    assert_eq!(workflow.dispatch(UserAction::CapturePhoto), None);

    match workflow.view() {
        ViewState::Previewing(stage) => {
            assert_eq!(stage.captured_label, "31.12.24 23:59:58");
            assert_eq!(stage.media.uri(), "file:///synthetic/back/IMG_1.jpg");
            assert_eq!(stage.media.kind(), MediaKind::Photo);
        }
        other => panic!("expected preview, got {other:?}"),
    }
}

#[test]
fn capture_surface_tests_midnight_timestamp_is_zero_padded() {
    let (mut workflow, _doubles) = WorkflowFixture::granted().start();
    workflow.capture_photo().expect("photo capture");

    let label = match workflow.view() {
        ViewState::Previewing(stage) => stage.captured_label.clone(),
        other => panic!("expected preview, got {other:?}"),
    };
    assert_eq!(label, "01.01.25 00:00:00");
    assert_eq!(label.len(), 17);
}

#[test]
fn capture_surface_tests_mode_toggle_is_noop_while_recording() {
    let (mut workflow, _doubles) = WorkflowFixture::granted().start();
    workflow.dispatch(UserAction::ToggleMode);
    workflow.dispatch(UserAction::StartRecording);
    assert!(workflow.view().is_recording());

    assert!(!workflow.toggle_mode());
    assert_eq!(workflow.dispatch(UserAction::ToggleMode), None);
    assert_eq!(workflow.camera_config().mode, CaptureMode::Video);
    assert!(workflow.view().is_recording());

    assert!(workflow.toggle_flash());
    assert!(workflow.toggle_facing());
}

#[test]
fn capture_surface_tests_flash_cycles_back_to_off() {
    let (mut workflow, _doubles) = WorkflowFixture::granted().start();
    let mut seen = Vec::new();
    for _ in 0..3 {
        workflow.dispatch(UserAction::ToggleFlash);
        seen.push(workflow.camera_config().flash);
    }

    assert_eq!(seen, vec![FlashMode::Auto, FlashMode::On, FlashMode::Off]);
}

#[test]
fn capture_surface_tests_shutter_follows_camera_mode() {
    let (mut workflow, _doubles) = WorkflowFixture::granted().start();

    assert!(workflow.start_recording().is_err());
    assert_eq!(workflow.dispatch(UserAction::StartRecording), None);
    assert_eq!(workflow.view(), &ViewState::Capturing);

    workflow.toggle_mode();
    assert!(workflow.capture_photo().is_err());
    assert_eq!(workflow.view(), &ViewState::Capturing);
}

#[test]
fn capture_surface_tests_capture_failure_stays_on_camera() {
    let (mut workflow, _doubles) = WorkflowFixture::granted()
        .camera(SyntheticCameraBackend::failing())
        .start();

    assert_eq!(workflow.dispatch(UserAction::CapturePhoto), Some(Notice::CaptureFailed));
    assert_eq!(workflow.view(), &ViewState::Capturing);

    workflow.toggle_mode();
    assert_eq!(workflow.dispatch(UserAction::StartRecording), Some(Notice::RecordingFailed));
    assert_eq!(workflow.view(), &ViewState::Capturing);
}

#[test]
fn capture_surface_tests_retake_discards_photo_and_video() {
    let (mut workflow, _doubles) = WorkflowFixture::granted().start();
    workflow.toggle_facing();

    workflow.capture_photo().expect("photo capture");
    assert!(workflow.retake());
    assert_eq!(workflow.view(), &ViewState::Capturing);
    assert_eq!(workflow.view().media_kind(), MediaKind::Photo);

    workflow.toggle_mode();
    workflow.start_recording().expect("recording starts");
    workflow.stop_recording().expect("recording stops");
    assert_eq!(workflow.view().media_kind(), MediaKind::Video);
    assert_eq!(workflow.dispatch(UserAction::Retake), None);
    assert_eq!(workflow.view(), &ViewState::Capturing);
    assert!(workflow.view().media().is_none());
    assert_eq!(workflow.view().media_kind(), MediaKind::Photo);

    assert_eq!(workflow.camera_config().facing, Facing::Front);
    assert!(!workflow.retake());
}

#[test]
fn capture_surface_tests_retake_cancels_pending_upload() {
    let (mut workflow, doubles) = WorkflowFixture::granted().start();
    workflow.capture_photo().expect("photo capture");
    workflow.begin_upload();

    assert!(workflow.retake());
    assert!(workflow.complete_upload().is_err());
    assert!(doubles.transport.sent().is_empty());
}

#[test]
fn capture_surface_tests_stop_without_recording_is_unavailable() {
    let (mut workflow, _doubles) = WorkflowFixture::granted().start();

    assert!(workflow.stop_recording().is_err());
    assert_eq!(workflow.view(), &ViewState::Capturing);
}

#[test]
fn capture_surface_tests_shutdown_finalizes_running_recording() {
    let (mut workflow, _doubles) = WorkflowFixture::granted().start();
    workflow.toggle_mode();
    workflow.start_recording().expect("recording starts");

    workflow.shutdown().expect("recording finalizes");

    let ViewState::Previewing(stage) = workflow.view() else {
        panic!("expected preview, got {:?}", workflow.view());
    };
    assert_eq!(stage.media.kind(), MediaKind::Video);
}

#[test]
fn capture_surface_tests_shutdown_logs_finalize_failure() {
    let (mut workflow, _doubles) = WorkflowFixture::granted()
        .camera(SyntheticCameraBackend::failing_finalize())
        .start();
    workflow.toggle_mode();
    workflow.start_recording().expect("recording starts");

    let (result, logs) = capture_logs(|| workflow.shutdown());

    assert!(matches!(result, Err(WorkflowError::Recording(_))));
    assert!(logs.contains("recording not finalized"), "{logs}");
    assert!(logs.contains("synthetic finalize failure"), "{logs}");
    assert!(matches!(workflow.view(), ViewState::Capturing));
}

#[test]
fn capture_surface_tests_shutdown_outside_recording_is_noop() {
    let (mut workflow, _doubles) = WorkflowFixture::granted().start();
    workflow.shutdown().expect("nothing to finalize");
    assert!(matches!(workflow.view(), ViewState::Capturing));
}
