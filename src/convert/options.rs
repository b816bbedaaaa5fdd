//! Import and export options

use serde::{Deserialize, Serialize};

/// Default name of the pseudo-field exported as a row's `path`
pub const DEFAULT_PATH_FIELD: &str = "_path";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Retry a failed field once with its string value parsed as JSON
    #[serde(default = "default_true")]
    pub reparse_string_values: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            reparse_string_values: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Field emitted as the row's `path` instead of a cell
    #[serde(default = "default_path_field")]
    pub path_field: String,

    /// Only these column ids become cells, when set
    #[serde(default)]
    pub columns: Option<Vec<String>>,

    /// Emit containers and structs as JSON text inside a string cell
    #[serde(default)]
    pub stringify_nested: bool,

    /// Indent the written document
    #[serde(default = "default_true")]
    pub pretty: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            path_field: default_path_field(),
            columns: None,
            stringify_nested: false,
            pretty: true,
        }
    }
}

impl ExportOptions {
    /// True when `column` passes the column filter
    pub fn exports_column(&self, column: &str) -> bool {
        match &self.columns {
            Some(columns) => columns.iter().any(|c| c == column),
            None => true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_path_field() -> String {
    DEFAULT_PATH_FIELD.to_string()
}
