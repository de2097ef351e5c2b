//! Conversion settings
//!
//! Loaded from a TOML file (`--config`) or built from a quick preset keyed by
//! dialect name. Validation happens at load time with descriptive errors.

use crate::dialect::OutputDialect;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The settings file could not be read
    #[error("Cannot read config file '{path}': {source}")]
    Read {
        /// File path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The settings file is not valid TOML for this schema
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field value failed validation
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Metadata generation options, per-run and never process-global
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MetadataSettings {
    /// Emit a metadata block at all (YAML front matter or HTML head)
    pub include_metadata: bool,
    /// Include the note's tags in the metadata block
    pub include_tags: bool,
    /// Split hierarchical tags `a/b` into independent tags `a` and `b`.
    /// Splitting runs before space normalization.
    pub split_tags: bool,
    /// Replace spaces in tag names with hyphens (applied after splitting)
    pub spaces_to_hyphens: bool,
    /// Prefix prepended to every emitted tag
    pub tag_prefix: String,
}

impl Default for MetadataSettings {
    fn default() -> Self {
        Self {
            include_metadata: true,
            include_tags: true,
            split_tags: false,
            spaces_to_hyphens: false,
            tag_prefix: String::new(),
        }
    }
}

/// Per-run conversion settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConversionSettings {
    /// Output dialect key; drives the pandoc target and the post-processing
    pub output_dialect: OutputDialect,
    /// Name of the per-notebook attachment subfolder
    pub attachment_folder: String,
    /// Bounded wait for one external conversion, in seconds
    pub conversion_timeout_seconds: u64,
    /// Suppress console reporting (logs are unaffected)
    pub silent: bool,
    /// Metadata generation options
    pub metadata: MetadataSettings,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            output_dialect: OutputDialect::Gfm,
            attachment_folder: "attachments".to_string(),
            conversion_timeout_seconds: 30,
            silent: false,
            metadata: MetadataSettings::default(),
        }
    }
}

impl ConversionSettings {
    /// Quick preset: dialect defaults with everything else standard
    pub fn quick(dialect: OutputDialect) -> Self {
        Self {
            output_dialect: dialect,
            ..Self::default()
        }
    }

    /// Load and validate settings from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = toml::from_str(&text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate field values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.attachment_folder.is_empty() {
            return Err(ConfigError::Invalid(
                "attachment_folder must not be empty".to_string(),
            ));
        }
        if self
            .attachment_folder
            .contains(|c| c == '/' || c == '\\' || c == '.')
        {
            return Err(ConfigError::Invalid(format!(
                "attachment_folder '{}' must be a plain folder name",
                self.attachment_folder
            )));
        }
        if self.conversion_timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "conversion_timeout_seconds must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
