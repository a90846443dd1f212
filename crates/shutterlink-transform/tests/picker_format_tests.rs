use image::{GenericImageView, RgbImage};
use shutterlink_capture::PHOTO_EXTENSIONS;
use shutterlink_core::{MediaKind, MediaRef};
use shutterlink_transform::{ImageTransform, JpegTransform, TransformOptions};

#[test]
fn picker_format_tests_every_offered_photo_extension_transforms() {
    let dir = tempfile::tempdir().expect("temp dir");
    let transform = JpegTransform::new(dir.path().join("out"));
    let options = TransformOptions::new(8, 70).expect("valid options");

    for extension in PHOTO_EXTENSIONS {
        let source_path = dir.path().join(format!("pick.{extension}"));
        RgbImage::from_pixel(16, 8, image::Rgb([30, 120, 200]))
            .save(&source_path)
            .unwrap_or_else(|error| panic!("{extension} fixture should save: {error}"));

        let source = MediaRef::from_path(&source_path, MediaKind::Photo).expect("media");
        let output = transform
            .transform(&source, &options)
            .unwrap_or_else(|error| panic!("{extension} should transform: {error}"));

        assert!(output.uri().ends_with("w.jpg"), "{extension}: {}", output.uri());
        let written = image::open(output.local_path()).expect("output should decode");
        assert_eq!(written.dimensions(), (8, 4), "{extension}");
    }
}
