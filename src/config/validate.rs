// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::dag::mutator::MAX_DEPENDENCIES;
use crate::errors::{Result, TaskDagError};
use crate::types::StorageMode;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = TaskDagError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.engine, raw.storage))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_engine(cfg)?;
    validate_storage(cfg)?;
    Ok(())
}

fn validate_engine(cfg: &RawConfigFile) -> Result<()> {
    // default_format is strongly typed and validated during deserialization.
    let max = cfg.engine.max_dependencies;
    if max == 0 || max > MAX_DEPENDENCIES {
        return Err(TaskDagError::ConfigError(format!(
            "[engine].max_dependencies must be between 1 and {MAX_DEPENDENCIES} (got {max})"
        )));
    }

    if cfg.engine.bottleneck_count == 0 {
        return Err(TaskDagError::ConfigError(
            "[engine].bottleneck_count must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn validate_storage(cfg: &RawConfigFile) -> Result<()> {
    if cfg.storage.mode == StorageMode::File && cfg.storage.dir.as_os_str().is_empty() {
        return Err(TaskDagError::ConfigError(
            "[storage].dir must be set when [storage].mode = \"file\"".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_src: &str) -> Result<ConfigFile> {
        let raw: RawConfigFile = toml::from_str(toml_src)?;
        ConfigFile::try_from(raw)
    }

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg.engine.max_dependencies, MAX_DEPENDENCIES);
        assert_eq!(cfg.engine.bottleneck_count, 5);
        assert!(cfg.engine.warn_on_completed_dependency);
        assert_eq!(cfg.storage.mode, StorageMode::File);
        assert_eq!(cfg.storage.dir, std::path::PathBuf::from(".taskdag"));
    }

    #[test]
    fn limit_above_hard_cap_is_rejected() {
        let err = parse("[engine]\nmax_dependencies = 51\n").unwrap_err();
        assert!(matches!(err, TaskDagError::ConfigError(msg) if msg.contains("max_dependencies")));
    }

    #[test]
    fn zero_bottlenecks_is_rejected() {
        assert!(parse("[engine]\nbottleneck_count = 0\n").is_err());
    }

    #[test]
    fn unknown_format_fails_to_parse() {
        let err = parse("[engine]\ndefault_format = \"svg\"\n").unwrap_err();
        assert!(matches!(err, TaskDagError::TomlError(_)));
    }

    #[test]
    fn file_mode_needs_dir() {
        assert!(parse("[storage]\nmode = \"file\"\ndir = \"\"\n").is_err());
        let cfg = parse("[storage]\nmode = \"file\"\ndir = \"data\"\n").unwrap();
        assert_eq!(cfg.storage.dir, std::path::PathBuf::from("data"));
    }
}
