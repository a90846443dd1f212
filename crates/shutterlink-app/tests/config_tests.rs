//! Integration tests for environment configuration.

use std::collections::HashMap;
use std::path::PathBuf;

use shutterlink_app::config::{
    ENV_CAMERA_BACK, ENV_CAMERA_FRONT, ENV_JPEG_QUALITY, ENV_LOCALE, ENV_MAX_WIDTH, ENV_MEDIA_DIR,
    ENV_UPLOAD_ENDPOINT, ENV_UPLOAD_PRESET,
};
use shutterlink_app::{AppConfig, ConfigError};
use shutterlink_transform::TransformOptions;
use shutterlink_ui::Locale;
use shutterlink_upload::DEFAULT_UPLOAD_ENDPOINT;

fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    AppConfig::from_lookup(|key| vars.get(key).cloned())
}

fn invalid_key(result: Result<AppConfig, ConfigError>) -> &'static str {
    match result {
        Err(ConfigError::InvalidValue { key, .. }) => key,
        Ok(config) => panic!("expected config error, got {config:?}"),
    }
}

#[test]
fn config_tests_defaults_when_unset() {
    let config = load(&[]).expect("defaults should load");

    assert_eq!(config.upload_endpoint, DEFAULT_UPLOAD_ENDPOINT);
    assert_eq!(config.upload_preset, "unsigned");
    assert_eq!(config.transform, TransformOptions::default());
    assert_eq!(config.transform.max_width, 1080);
    assert_eq!(config.transform.quality, 70);
    assert_eq!(config.back_camera, "/dev/video0");
    assert_eq!(config.ffmpeg, "ffmpeg");
    assert_eq!(config.locale, Locale::English);
    assert_eq!(config.log_dir, config.media_dir);
}

#[test]
fn config_tests_reads_overrides() {
    let config = load(&[
        (ENV_UPLOAD_PRESET, "team-preset"),
        (ENV_MAX_WIDTH, " 640 "),
        (ENV_JPEG_QUALITY, "85"),
        (ENV_LOCALE, "vi"),
        (ENV_MEDIA_DIR, "/var/tmp/shots"),
        (ENV_UPLOAD_ENDPOINT, "https://upload.example.com/v1/image"),
    ])
    .expect("overrides should load");

    assert_eq!(config.upload_preset, "team-preset");
    assert_eq!(config.transform.max_width, 640);
    assert_eq!(config.transform.quality, 85);
    assert_eq!(config.locale, Locale::Vietnamese);
    assert_eq!(config.media_dir, PathBuf::from("/var/tmp/shots"));
    assert_eq!(config.log_dir, PathBuf::from("/var/tmp/shots"));
    assert_eq!(config.upload_endpoint, "https://upload.example.com/v1/image");
}

#[test]
fn config_tests_blank_values_use_defaults() {
    let config = load(&[(ENV_UPLOAD_PRESET, "  "), (ENV_LOCALE, "")]).expect("blank values");

    assert_eq!(config.upload_preset, "unsigned");
    assert_eq!(config.locale, Locale::English);
}

#[test]
fn config_tests_rejects_invalid_values() {
    assert_eq!(
        invalid_key(load(&[(ENV_UPLOAD_ENDPOINT, "http://insecure.example.com/upload")])),
        ENV_UPLOAD_ENDPOINT
    );
    assert_eq!(invalid_key(load(&[(ENV_MAX_WIDTH, "wide")])), ENV_MAX_WIDTH);
    assert_eq!(invalid_key(load(&[(ENV_MAX_WIDTH, "0")])), ENV_MAX_WIDTH);
    assert_eq!(invalid_key(load(&[(ENV_JPEG_QUALITY, "0")])), ENV_JPEG_QUALITY);
    assert_eq!(invalid_key(load(&[(ENV_JPEG_QUALITY, "300")])), ENV_JPEG_QUALITY);
    assert_eq!(invalid_key(load(&[(ENV_LOCALE, "fr")])), ENV_LOCALE);
}

#[test]
fn config_tests_camera_devices_are_deduplicated() {
    let shared = load(&[(ENV_CAMERA_BACK, "/dev/video2"), (ENV_CAMERA_FRONT, "/dev/video2")])
        .expect("config");
    assert_eq!(shared.camera_devices(), vec![PathBuf::from("/dev/video2")]);

    let split = load(&[]).expect("config");
    assert_eq!(split.camera_devices().len(), 2);
}
