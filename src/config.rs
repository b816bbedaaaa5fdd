//! gridtable configuration
//!
//! One JSON file, every section optional:
//!
//! ```json
//! {
//!   "table": { "key_field": "Name", "allow_duplicate_rows": false },
//!   "import": { "reparse_string_values": true },
//!   "export": { "path_field": "_path", "pretty": true },
//!   "localization": { "target_cultures": ["fr", "de"] }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::convert::{ExportOptions, ImportOptions};
use crate::localization::LocalizationSettings;
use crate::observability::{log_event_with_fields, Event};
use crate::table::TablePolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub table: TablePolicy,

    #[serde(default)]
    pub import: ImportOptions,

    #[serde(default)]
    pub export: ExportOptions,

    #[serde(default)]
    pub localization: LocalizationSettings,
}

impl Config {
    /// Load and validate configuration from file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&content)?;

        log_event_with_fields(
            Event::ConfigLoaded,
            &[
                ("key_field", config.table.key_field()),
                ("path", &path.display().to_string()),
            ],
        );
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.export.path_field.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "export.path_field must not be empty".to_string(),
            ));
        }

        if let Some(columns) = &self.export.columns {
            if columns.iter().any(|c| c.trim().is_empty()) {
                return Err(ConfigError::Invalid(
                    "export.columns must not contain empty column ids".to_string(),
                ));
            }
        }

        let localization = &self.localization;
        if localization.export_context && localization.context_column_id.is_empty() {
            return Err(ConfigError::Invalid(
                "localization.context_column_id must not be empty when export_context is set"
                    .to_string(),
            ));
        }
        for (key, info) in &localization.metadata_mapping {
            if info.name.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "localization.metadata_mapping.{} has an empty column name",
                    key
                )));
            }
        }

        Ok(())
    }
}
