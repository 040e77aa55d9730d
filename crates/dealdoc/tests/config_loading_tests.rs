//! Configuration loading integration tests.
//!
//! Tests the config loading APIs:
//! - from_file() with TOML/YAML/JSON
//! - discover() for searching parent directories
//! - Error handling for invalid configs

use dealdoc::DealdocError;
use dealdoc::core::config::ExtractionConfig;
use std::fs;
use tempfile::TempDir;

/// Test loading config from TOML file.
#[test]
fn test_from_file_toml_succeeds() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let toml_content = r#"
enable_cleaning = false
min_output_chars = 20

[pdf]
max_pages = 25
structured_min_chars = 80

[docx]
min_chars = 3
"#;

    fs::write(&config_path, toml_content).unwrap();

    let config = ExtractionConfig::from_file(&config_path).unwrap();

    assert!(!config.enable_cleaning);
    assert_eq!(config.min_output_chars, 20);
    assert_eq!(config.pdf.max_pages, 25);
    assert_eq!(config.pdf.structured_min_chars, 80);
    assert_eq!(config.pdf.content_stream_min_chars, 20, "Unset fields keep defaults");
    assert_eq!(config.docx.min_chars, 3);
}

/// Test loading config from YAML file.
#[test]
fn test_from_file_yaml_succeeds() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yml");

    let yaml_content = r#"
max_concurrent_extractions: 4
pdf:
  max_pages: 3
  raw_scan_min_chars: 15
"#;

    fs::write(&config_path, yaml_content).unwrap();

    let config = ExtractionConfig::from_file(&config_path).unwrap();

    assert_eq!(config.max_concurrent_extractions, Some(4));
    assert_eq!(config.pdf.max_pages, 3);
    assert_eq!(config.pdf.raw_scan_min_chars, 15);
    assert!(config.enable_cleaning);
}

/// Test loading config from JSON file.
#[test]
fn test_from_file_json_succeeds() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.json");

    fs::write(&config_path, r#"{"min_output_chars": 1, "docx": {"min_chars": 1}}"#).unwrap();

    let config = ExtractionConfig::from_file(&config_path).unwrap();

    assert_eq!(config.min_output_chars, 1);
    assert_eq!(config.docx.min_chars, 1);
    assert_eq!(config.pdf.max_pages, 10);
}

/// Test unknown extensions are rejected.
#[test]
fn test_from_file_unsupported_extension() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.ini");
    fs::write(&config_path, "max_pages = 1").unwrap();

    let err = ExtractionConfig::from_file(&config_path).unwrap_err();

    match err {
        DealdocError::Validation { message, .. } => {
            assert!(message.contains("Unsupported config file format"), "{}", message);
        }
        other => panic!("Expected validation error, got {:?}", other),
    }
}

/// Test missing files produce a validation error naming the path.
#[test]
fn test_from_file_missing() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("absent.toml");

    let err = ExtractionConfig::from_file(&config_path).unwrap_err();
    assert!(matches!(err, DealdocError::Validation { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

/// Test malformed content and out-of-range values are rejected.
#[test]
fn test_from_file_invalid_content() {
    let temp_dir = TempDir::new().unwrap();

    let broken = temp_dir.path().join("broken.toml");
    fs::write(&broken, "[pdf\nmax_pages = ").unwrap();
    assert!(matches!(
        ExtractionConfig::from_file(&broken),
        Err(DealdocError::Validation { .. })
    ));

    let zero_pages = temp_dir.path().join("zero.json");
    fs::write(&zero_pages, r#"{"pdf": {"max_pages": 0}}"#).unwrap();
    assert!(matches!(
        ExtractionConfig::from_file(&zero_pages),
        Err(DealdocError::Validation { .. })
    ));

    let zero_workers = temp_dir.path().join("zero.yaml");
    fs::write(&zero_workers, "max_concurrent_extractions: 0\n").unwrap();
    assert!(ExtractionConfig::from_file(&zero_workers).is_err());
}

/// Test discover() finds config in current directory.
#[test]
#[serial_test::serial]
fn test_discover_finds_config_in_current_dir() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("dealdoc.toml"), "[pdf]\nmax_pages = 4\n").unwrap();

    let original_dir = std::env::current_dir().unwrap();
    std::env::set_current_dir(temp_dir.path()).unwrap();

    let result = ExtractionConfig::discover();

    std::env::set_current_dir(original_dir).unwrap();

    let config = result.unwrap().expect("Should find config in current directory");
    assert_eq!(config.pdf.max_pages, 4);
}

/// Test discover() finds config in parent directory.
#[test]
#[serial_test::serial]
fn test_discover_finds_config_in_parent_dir() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("dealdoc.toml"), "min_output_chars = 42\n").unwrap();

    let sub_dir = temp_dir.path().join("uploads").join("2026");
    fs::create_dir_all(&sub_dir).unwrap();

    let original_dir = std::env::current_dir().unwrap();
    std::env::set_current_dir(&sub_dir).unwrap();

    let result = ExtractionConfig::discover();

    std::env::set_current_dir(original_dir).unwrap();

    let config = result.unwrap().expect("Should find config in parent directory");
    assert_eq!(config.min_output_chars, 42);
}

/// Test discover() surfaces an invalid discovered file instead of ignoring it.
#[test]
#[serial_test::serial]
fn test_discover_invalid_config_is_error() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("dealdoc.toml"), "[pdf]\nmax_pages = 0\n").unwrap();

    let original_dir = std::env::current_dir().unwrap();
    std::env::set_current_dir(temp_dir.path()).unwrap();

    let result = ExtractionConfig::discover();

    std::env::set_current_dir(original_dir).unwrap();

    assert!(result.is_err());
}
