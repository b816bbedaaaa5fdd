//! Canonical row identifiers

use std::borrow::Borrow;
use std::fmt;

use crate::record::{validate_name, INVALID_NAME_CHARS};

/// A non-empty, canonical row key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowName(String);

impl RowName {
    /// Canonicalises a raw key.
    ///
    /// Surrounding whitespace is trimmed and invalid identifier characters
    /// become `_`. Returns `None` for an empty key or the literal `None`.
    pub fn make_valid(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
            return None;
        }
        let name: String = trimmed
            .chars()
            .map(|c| {
                if c.is_control() || INVALID_NAME_CHARS.contains(c) {
                    '_'
                } else {
                    c
                }
            })
            .collect();
        debug_assert!(validate_name(&name).is_ok());
        Some(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for RowName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RowName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
