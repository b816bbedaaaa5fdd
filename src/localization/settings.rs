//! Localized-text export settings

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// How a metadata cell value is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnDataType {
    String,
    Number,
}

/// Target column of one metadata key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(default = "default_data_type")]
    pub data_type: ColumnDataType,
}

fn default_data_type() -> ColumnDataType {
    ColumnDataType::String
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizationSettings {
    /// Row id is `namespace,key` instead of `key`
    #[serde(default = "default_true")]
    pub use_combined_namespace_id: bool,

    /// Export the namespace even when it is part of the id
    #[serde(default)]
    pub also_export_namespace_column: bool,

    /// `path` puts the namespace in the row's path, anything else names a cell
    #[serde(default = "default_namespace_column_id")]
    pub namespace_column_id: String,

    #[serde(default = "default_source_prefix")]
    pub source_language_column_prefix: String,

    #[serde(default = "default_target_prefix")]
    pub target_language_column_prefix: String,

    #[serde(default = "default_true")]
    pub export_context: bool,

    #[serde(default = "default_context_column_id")]
    pub context_column_id: String,

    #[serde(default)]
    pub export_metadata: bool,

    /// Metadata key to column
    #[serde(default)]
    pub metadata_mapping: IndexMap<String, ColumnInfo>,

    /// Culture code to Gridly language code, overriding the derived form
    #[serde(default)]
    pub culture_map: IndexMap<String, String>,

    /// Cultures exported as target columns
    #[serde(default)]
    pub target_cultures: Vec<String>,
}

impl Default for LocalizationSettings {
    fn default() -> Self {
        Self {
            use_combined_namespace_id: true,
            also_export_namespace_column: false,
            namespace_column_id: default_namespace_column_id(),
            source_language_column_prefix: default_source_prefix(),
            target_language_column_prefix: default_target_prefix(),
            export_context: true,
            context_column_id: default_context_column_id(),
            export_metadata: false,
            metadata_mapping: IndexMap::new(),
            culture_map: IndexMap::new(),
            target_cultures: Vec::new(),
        }
    }
}

impl LocalizationSettings {
    /// True when the namespace is written somewhere besides the id
    pub fn exports_namespace(&self) -> bool {
        !self.use_combined_namespace_id || self.also_export_namespace_column
    }

    pub fn namespace_is_path(&self) -> bool {
        self.namespace_column_id == "path"
    }
}

fn default_true() -> bool {
    true
}

fn default_namespace_column_id() -> String {
    "path".to_string()
}

fn default_source_prefix() -> String {
    "src_".to_string()
}

fn default_target_prefix() -> String {
    "tg_".to_string()
}

fn default_context_column_id() -> String {
    "context".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let settings: LocalizationSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, LocalizationSettings::default());
        assert!(settings.use_combined_namespace_id);
        assert!(!settings.exports_namespace());
        assert!(settings.namespace_is_path());
        assert_eq!(settings.source_language_column_prefix, "src_");
        assert_eq!(settings.target_language_column_prefix, "tg_");
    }

    #[test]
    fn test_metadata_mapping_parses() {
        let settings: LocalizationSettings = serde_json::from_str(
            r#"{"metadata_mapping": {"MaxLength": {"name": "max_len", "data_type": "Number"}, "Speaker": {"name": "speaker"}}}"#,
        )
        .unwrap();
        assert_eq!(settings.metadata_mapping["MaxLength"].data_type, ColumnDataType::Number);
        assert_eq!(settings.metadata_mapping["Speaker"].data_type, ColumnDataType::String);
    }
}
