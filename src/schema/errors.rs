//! Schema error types
//!
//! Error codes:
//! - GRID_SCHEMA_MALFORMED
//! - GRID_SCHEMA_DUPLICATE_TYPE
//! - GRID_SCHEMA_UNKNOWN_TYPE
//! - GRID_SCHEMA_CYCLE
//! - GRID_SCHEMA_INVALID_FIELD
//! - GRID_SCHEMA_NO_ROW_STRUCT
//!
//! All schema errors are fatal to the load that raised them.

use std::fmt;

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// File unreadable or not valid JSON for a schema definition
    GridSchemaMalformed,
    /// Two enums or structs share a name
    GridSchemaDuplicateType,
    /// A field references an enum or struct that is not defined
    GridSchemaUnknownType,
    /// Structs reference each other in a loop
    GridSchemaCycle,
    /// Field definition is unusable (zero arity, empty name)
    GridSchemaInvalidField,
    /// The row struct is missing or undefined
    GridSchemaNoRowStruct,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::GridSchemaMalformed => "GRID_SCHEMA_MALFORMED",
            SchemaErrorCode::GridSchemaDuplicateType => "GRID_SCHEMA_DUPLICATE_TYPE",
            SchemaErrorCode::GridSchemaUnknownType => "GRID_SCHEMA_UNKNOWN_TYPE",
            SchemaErrorCode::GridSchemaCycle => "GRID_SCHEMA_CYCLE",
            SchemaErrorCode::GridSchemaInvalidField => "GRID_SCHEMA_INVALID_FIELD",
            SchemaErrorCode::GridSchemaNoRowStruct => "GRID_SCHEMA_NO_ROW_STRUCT",
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error type with context
#[derive(Debug)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    /// Type the error was raised for, if any
    type_name: Option<String>,
}

impl SchemaError {
    /// Create an error for a malformed schema file
    pub fn malformed_schema(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::GridSchemaMalformed,
            message: format!("Malformed schema file '{}': {}", path.into(), reason.into()),
            type_name: None,
        }
    }

    /// Create a duplicate type error
    pub fn duplicate_type(type_name: impl Into<String>) -> Self {
        let name = type_name.into();
        Self {
            code: SchemaErrorCode::GridSchemaDuplicateType,
            message: format!("Type '{}' is defined more than once", name),
            type_name: Some(name),
        }
    }

    /// Create an unknown type reference error
    pub fn unknown_type(owner: &str, field: &str, type_name: impl Into<String>) -> Self {
        let name = type_name.into();
        Self {
            code: SchemaErrorCode::GridSchemaUnknownType,
            message: format!(
                "Field '{}.{}' references unknown type '{}'",
                owner, field, name
            ),
            type_name: Some(name),
        }
    }

    /// Create a reference cycle error
    pub fn cycle(path: &[String]) -> Self {
        Self {
            code: SchemaErrorCode::GridSchemaCycle,
            message: format!("Struct reference cycle: {}", path.join(" -> ")),
            type_name: path.first().cloned(),
        }
    }

    /// Create an invalid field error
    pub fn invalid_field(owner: &str, field: &str, reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::GridSchemaInvalidField,
            message: format!("Field '{}.{}' is invalid: {}", owner, field, reason.into()),
            type_name: Some(owner.to_string()),
        }
    }

    /// Create a missing row struct error
    pub fn no_row_struct(name: Option<&str>) -> Self {
        let message = match name {
            Some(n) => format!("Row struct '{}' is not defined", n),
            None => "Schema does not name a row struct".to_string(),
        };
        Self {
            code: SchemaErrorCode::GridSchemaNoRowStruct,
            message,
            type_name: name.map(str::to_string),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the type the error concerns, if known
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SchemaErrorCode::GridSchemaMalformed.code(), "GRID_SCHEMA_MALFORMED");
        assert_eq!(SchemaErrorCode::GridSchemaCycle.code(), "GRID_SCHEMA_CYCLE");
        assert_eq!(SchemaErrorCode::GridSchemaNoRowStruct.code(), "GRID_SCHEMA_NO_ROW_STRUCT");
    }

    #[test]
    fn test_display_includes_code_and_message() {
        let err = SchemaError::unknown_type("ItemRow", "Rarity", "RarityEnum");
        let display = format!("{}", err);
        assert!(display.starts_with("GRID_SCHEMA_UNKNOWN_TYPE"));
        assert!(display.contains("ItemRow.Rarity"));
        assert_eq!(err.type_name(), Some("RarityEnum"));
    }

    #[test]
    fn test_cycle_message_lists_path() {
        let err = SchemaError::cycle(&["A".into(), "B".into(), "A".into()]);
        assert!(err.message().contains("A -> B -> A"));
    }
}
