// tests/error_handling.rs

use std::io::Write;
use tempfile::NamedTempFile;
use taskdag::config::{load_and_validate, load_or_default};
use taskdag::errors::TaskDagError;
use taskdag::types::{StorageMode, VisualizationFormat};

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn test_full_config_is_loaded() {
    let file = config_file(
        r#"
[engine]
max_dependencies = 20
bottleneck_count = 3
warn_on_completed_dependency = false
default_format = "dot"

[storage]
mode = "file"
dir = "lists"
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.engine.max_dependencies, 20);
    assert_eq!(cfg.engine.default_format, VisualizationFormat::Dot);
    assert_eq!(cfg.storage.mode, StorageMode::File);

    let rules = cfg.dependency_rules();
    assert_eq!(rules.max_dependencies, 20);
    assert!(!rules.warn_on_completed_dependency);
    assert_eq!(cfg.analysis_options(None).bottleneck_count, 3);
}

#[test]
fn test_limit_out_of_range_returns_config_error() {
    let file = config_file("[engine]\nmax_dependencies = 0\n");

    match load_and_validate(file.path()) {
        Err(TaskDagError::ConfigError(msg)) => {
            assert!(msg.contains("max_dependencies"));
            assert!(msg.contains("got 0"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_malformed_toml_returns_toml_error() {
    let file = config_file("[engine\nmax_dependencies = ");

    match load_and_validate(file.path()) {
        Err(TaskDagError::TomlError(_)) => {}
        Err(e) => panic!("Expected TomlError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_unknown_storage_mode_is_rejected() {
    let file = config_file("[storage]\nmode = \"s3\"\n");
    assert!(matches!(load_and_validate(file.path()), Err(TaskDagError::TomlError(_))));
}

#[test]
fn test_missing_file_is_io_error_but_defaults_when_optional() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Taskdag.toml");

    assert!(matches!(load_and_validate(&path), Err(TaskDagError::IoError(_))));

    let cfg = load_or_default(&path).unwrap();
    assert_eq!(cfg.engine.max_dependencies, 50);
    assert_eq!(cfg.storage.mode, StorageMode::File);
}
