//! YAML configuration file support for result grouping.
//!
//! Services that host the grouping engine usually keep its knobs next to the
//! rest of their deployment config. This module loads them from a YAML file
//! and turns them into a [`GroupingConfig`].
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "frame-search"
//!
//! grouping:
//!   similarity_threshold: 0.8
//!   mismatch_policy: "abort"   # or "skip"
//!   max_items: 5000
//!   use_parallel: true
//! ```

use std::fs;
use std::path::Path;

use grouping::{GroupingConfig, GroupingError, MismatchPolicy, DEFAULT_SIMILARITY_THRESHOLD};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(#[from] GroupingError),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct GroupingFileConfig {
    /// Configuration format version
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    /// Grouping engine configuration
    #[serde(default)]
    pub grouping: GroupingYamlConfig,
}

impl GroupingFileConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: GroupingFileConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;
        self.grouping.to_grouping_config().validate()?;
        Ok(())
    }

    /// Consume the file and return the engine configuration it describes.
    pub fn into_grouping_config(self) -> GroupingConfig {
        self.grouping.to_grouping_config()
    }
}

impl Default for GroupingFileConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            grouping: GroupingYamlConfig::default(),
        }
    }
}

/// Grouping section of the YAML file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupingYamlConfig {
    #[serde(default = "default_threshold")]
    pub similarity_threshold: f32,

    /// `abort` or `skip`.
    #[serde(default)]
    pub mismatch_policy: MismatchPolicy,

    #[serde(default)]
    pub max_items: Option<usize>,

    #[serde(default)]
    pub use_parallel: bool,
}

impl GroupingYamlConfig {
    /// Convert to the engine configuration.
    pub fn to_grouping_config(&self) -> GroupingConfig {
        GroupingConfig {
            similarity_threshold: self.similarity_threshold,
            mismatch_policy: self.mismatch_policy,
            max_items: self.max_items,
            use_parallel: self.use_parallel,
        }
    }
}

impl Default for GroupingYamlConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_threshold(),
            mismatch_policy: MismatchPolicy::default(),
            max_items: None,
            use_parallel: false,
        }
    }
}

fn default_threshold() -> f32 {
    DEFAULT_SIMILARITY_THRESHOLD
}
