//! Config file loading.

use std::io::Write;

use gpu_essentials::samples::SampleKind;
use gpu_essentials::{ConfigError, SampleConfig};

#[test]
fn test_load_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"{{ "sample": "grayscale", "image": "photo.png", "headless_frames": 3, "vsync": false }}"#
    )
    .unwrap();

    let config = SampleConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.sample, SampleKind::Grayscale);
    assert_eq!(config.image.as_deref(), Some(std::path::Path::new("photo.png")));
    assert_eq!(config.headless_frames, 3);
    assert!(!config.vsync);
    assert_eq!(config.width, SampleConfig::default().width);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = SampleConfig::from_json_file(dir.path().join("absent.json"));
    assert!(matches!(result, Err(ConfigError::Io { .. })));
}

#[test]
fn test_malformed_file_is_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{ \"width\": \"wide\" }}").unwrap();
    let result = SampleConfig::from_json_file(file.path());
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}
