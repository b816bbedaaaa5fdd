//! Conversion error types
//!
//! Error codes:
//! - GRID_EMPTY_INPUT
//! - GRID_NO_ROW_STRUCT
//! - GRID_JSON_PARSE
//! - GRID_JSON_WRITE
//!
//! These are the structural failures that abort a whole import or export.
//! Everything else is a problem entry and the call carries on.

use std::fmt;

/// Conversion error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertErrorCode {
    /// Import text is empty
    GridEmptyInput,
    /// Table has no row struct
    GridNoRowStruct,
    /// Import text is not a JSON array
    GridJsonParse,
    /// Export document could not be serialized
    GridJsonWrite,
}

impl ConvertErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ConvertErrorCode::GridEmptyInput => "GRID_EMPTY_INPUT",
            ConvertErrorCode::GridNoRowStruct => "GRID_NO_ROW_STRUCT",
            ConvertErrorCode::GridJsonParse => "GRID_JSON_PARSE",
            ConvertErrorCode::GridJsonWrite => "GRID_JSON_WRITE",
        }
    }
}

impl fmt::Display for ConvertErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertError {
    code: ConvertErrorCode,
    message: String,
}

impl ConvertError {
    pub fn new(code: ConvertErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn empty_input() -> Self {
        Self::new(ConvertErrorCode::GridEmptyInput, "Input data is empty.")
    }

    pub fn no_row_struct() -> Self {
        Self::new(ConvertErrorCode::GridNoRowStruct, "No row struct specified.")
    }

    pub fn json_parse(reason: impl fmt::Display) -> Self {
        Self::new(
            ConvertErrorCode::GridJsonParse,
            format!("Failed to parse the JSON data. Error: {}", reason),
        )
    }

    pub fn json_write(reason: impl fmt::Display) -> Self {
        Self::new(
            ConvertErrorCode::GridJsonWrite,
            format!("Failed to write the JSON data. Error: {}", reason),
        )
    }

    pub fn code(&self) -> ConvertErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for ConvertError {}

/// Result type for conversion operations
pub type ConvertResult<T> = Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ConvertErrorCode::GridEmptyInput.code(), "GRID_EMPTY_INPUT");
        assert_eq!(ConvertErrorCode::GridJsonWrite.code(), "GRID_JSON_WRITE");
    }

    #[test]
    fn test_display() {
        let err = ConvertError::json_parse("expected value at line 1 column 1");
        assert_eq!(
            err.to_string(),
            "GRID_JSON_PARSE: Failed to parse the JSON data. Error: expected value at line 1 column 1"
        );
        assert_eq!(err.code(), ConvertErrorCode::GridJsonParse);
    }
}
