//! Integration tests for upload filename and MIME inference.

use shutterlink_core::{MediaKind, infer_file_metadata, infer_filename, infer_mime_type};

#[test]
fn file_metadata_tests_use_last_segment_and_extension() {
    let metadata = infer_file_metadata("file:///data/cache/abc/photo123.heic", MediaKind::Photo);
    assert_eq!(metadata.filename, "photo123.heic");
    assert_eq!(metadata.mime_type, "image/heic");
}

#[test]
fn file_metadata_tests_fall_back_for_extensionless_video() {
    let metadata = infer_file_metadata("content://media/external/video/4821", MediaKind::Video);
    assert_eq!(metadata.filename, "video.mp4");
    assert_eq!(metadata.mime_type, "video/mp4");
}

#[test]
fn file_metadata_tests_fall_back_for_trailing_slash() {
    assert_eq!(infer_filename("file:///tmp/captures/", MediaKind::Photo), "photo.jpg");
    assert_eq!(infer_filename("", MediaKind::Video), "video.mp4");
}

#[test]
fn file_metadata_tests_tag_mime_by_media_kind() {
    assert_eq!(infer_mime_type("clip.MOV", MediaKind::Video), "video/mov");
    assert_eq!(infer_mime_type("frame.png", MediaKind::Photo), "image/png");
    assert_eq!(infer_mime_type("frame", MediaKind::Photo), "image/jpeg");
}
