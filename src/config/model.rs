// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::dag::analysis::{AnalysisOptions, DEFAULT_BOTTLENECK_COUNT};
use crate::dag::mutator::{DependencyRules, MAX_DEPENDENCIES};
use crate::types::{StorageMode, VisualizationFormat};

/// Configuration exactly as read from TOML, before validation.
///
/// ```toml
/// [engine]
/// max_dependencies = 50
/// bottleneck_count = 5
/// warn_on_completed_dependency = true
/// default_format = "mermaid"
///
/// [storage]
/// mode = "file"
/// dir = ".taskdag"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub engine: EngineSection,

    #[serde(default)]
    pub storage: StorageSection,
}

/// Validated configuration. Build it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub engine: EngineSection,
    pub storage: StorageSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(engine: EngineSection, storage: StorageSection) -> Self {
        Self { engine, storage }
    }

    pub fn dependency_rules(&self) -> DependencyRules {
        DependencyRules {
            max_dependencies: self.engine.max_dependencies,
            warn_on_completed_dependency: self.engine.warn_on_completed_dependency,
        }
    }

    pub fn analysis_options(&self, format: Option<VisualizationFormat>) -> AnalysisOptions {
        AnalysisOptions {
            format: format.unwrap_or(self.engine.default_format),
            bottleneck_count: self.engine.bottleneck_count,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(EngineSection::default(), StorageSection::default())
    }
}

/// `[engine]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSection {
    /// Per-task dependency limit, `1..=50`.
    #[serde(default = "default_max_dependencies")]
    pub max_dependencies: usize,

    /// Number of bottleneck tasks reported by analysis.
    #[serde(default = "default_bottleneck_count")]
    pub bottleneck_count: usize,

    /// Whether depending on an already-completed task produces a warning.
    #[serde(default = "default_true")]
    pub warn_on_completed_dependency: bool,

    /// Visualization format used when the caller does not pick one.
    #[serde(default)]
    pub default_format: VisualizationFormat,
}

fn default_max_dependencies() -> usize {
    MAX_DEPENDENCIES
}

fn default_bottleneck_count() -> usize {
    DEFAULT_BOTTLENECK_COUNT
}

fn default_true() -> bool {
    true
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            max_dependencies: default_max_dependencies(),
            bottleneck_count: default_bottleneck_count(),
            warn_on_completed_dependency: true,
            default_format: VisualizationFormat::default(),
        }
    }
}

/// `[storage]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSection {
    #[serde(default)]
    pub mode: StorageMode,

    /// Directory holding one JSON file per list (file mode only).
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from(".taskdag")
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            mode: StorageMode::default(),
            dir: default_storage_dir(),
        }
    }
}
