//! Table-wide import policy

use serde::{Deserialize, Serialize};

/// Key field used when none is configured
pub const DEFAULT_KEY_FIELD: &str = "Name";

/// Flags the importer consults for every row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TablePolicy {
    /// JSON key holding the row name
    #[serde(default = "default_key_field")]
    pub key_field: String,

    /// Accept a second row with an existing key (the later row wins)
    #[serde(default)]
    pub allow_duplicate_rows: bool,

    /// Do not report JSON keys that match no field
    #[serde(default)]
    pub ignore_extra_fields: bool,

    /// Do not report fields with no JSON value
    #[serde(default)]
    pub ignore_missing_fields: bool,
}

fn default_key_field() -> String {
    DEFAULT_KEY_FIELD.to_string()
}

impl Default for TablePolicy {
    fn default() -> Self {
        Self {
            key_field: default_key_field(),
            allow_duplicate_rows: false,
            ignore_extra_fields: false,
            ignore_missing_fields: false,
        }
    }
}

impl TablePolicy {
    /// Effective key field; an empty setting means `Name`
    pub fn key_field(&self) -> &str {
        if self.key_field.trim().is_empty() {
            DEFAULT_KEY_FIELD
        } else {
            &self.key_field
        }
    }
}
