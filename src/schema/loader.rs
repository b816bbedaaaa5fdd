//! Schema loader: reads schema definition files and resolves them into
//! shared record type descriptors.
//!
//! A definition file looks like:
//!
//! ```json
//! {
//!   "enums":   [{ "name": "Rarity", "symbols": ["Common", "Rare"] }],
//!   "structs": [{ "name": "ItemRow", "fields": [
//!                  { "name": "Level", "type": "int", "width": "u8" },
//!                  { "name": "Rarity", "type": "enum", "enum": "Rarity" },
//!                  { "name": "Tags", "type": "array", "inner": { "type": "name" } }
//!              ]}],
//!   "row_struct": "ItemRow"
//! }
//! ```
//!
//! References are by name and may point forward. Struct references must
//! not form a cycle, since every instance embeds its nested structs.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::observability::{log_event_with_fields, Event};

use super::errors::{SchemaError, SchemaResult};
use super::types::{EnumSymbol, EnumType, FieldDescriptor, FieldKind, FloatWidth, IntWidth, RecordType};

/// On-disk schema definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaFile {
    #[serde(default)]
    pub enums: Vec<EnumDef>,
    #[serde(default)]
    pub structs: Vec<StructDef>,
    /// Struct used for table rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_struct: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumDef {
    pub name: String,
    pub symbols: Vec<SymbolDef>,
}

/// Enum symbol, either a bare name (previous value + 1) or an explicit pair
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SymbolDef {
    Implicit(String),
    Explicit { name: String, value: i64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructDef {
    pub name: String,
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(flatten)]
    pub field_type: FieldTypeDef,
    #[serde(default = "default_arity")]
    pub arity: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Skip the missing-entry problem when absent from a row
    #[serde(default)]
    pub optional: bool,
}

fn default_arity() -> usize {
    1
}

/// Field type as written in a definition file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldTypeDef {
    Bool,
    Int {
        #[serde(default)]
        width: IntWidth,
        /// Enum this numeric field represents
        #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
        enum_name: Option<String>,
    },
    Float {
        #[serde(default)]
        width: FloatWidth,
    },
    Enum {
        #[serde(rename = "enum")]
        enum_name: String,
    },
    String,
    Name,
    Array {
        inner: Box<FieldTypeDef>,
    },
    Set {
        inner: Box<FieldTypeDef>,
    },
    Map {
        key: Box<FieldTypeDef>,
        value: Box<FieldTypeDef>,
    },
    Struct {
        #[serde(rename = "struct")]
        struct_name: String,
    },
}

/// Registry of resolved enums and record types.
#[derive(Debug, Default)]
pub struct SchemaLoader {
    enums: HashMap<String, Arc<EnumType>>,
    structs: HashMap<String, Arc<RecordType>>,
    row_struct: Option<String>,
}

impl SchemaLoader {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a definition file from disk.
    pub fn load_file(&mut self, path: &Path) -> SchemaResult<()> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::malformed_schema(
                path.display().to_string(),
                format!("Failed to read file: {}", e),
            )
        })?;
        self.load_str(&content, &path.display().to_string())
    }

    /// Loads a definition from JSON text. `origin` names the source in errors.
    pub fn load_str(&mut self, content: &str, origin: &str) -> SchemaResult<()> {
        let file: SchemaFile = serde_json::from_str(content)
            .map_err(|e| SchemaError::malformed_schema(origin, format!("Invalid JSON: {}", e)))?;
        self.load_definition(file)
    }

    /// Resolves and registers every type in a parsed definition.
    ///
    /// Nothing is registered unless the whole definition resolves.
    pub fn load_definition(&mut self, file: SchemaFile) -> SchemaResult<()> {
        let mut staged = SchemaLoader {
            enums: self.enums.clone(),
            structs: self.structs.clone(),
            row_struct: self.row_struct.clone(),
        };

        for def in &file.enums {
            staged.register_enum(build_enum(def))?;
        }

        let mut defs: HashMap<&str, &StructDef> = HashMap::new();
        for def in &file.structs {
            if staged.structs.contains_key(&def.name)
                || staged.enums.contains_key(&def.name)
                || defs.insert(def.name.as_str(), def).is_some()
            {
                return Err(SchemaError::duplicate_type(&def.name));
            }
        }

        let mut stack = Vec::new();
        for def in &file.structs {
            staged.resolve_struct(&def.name, &defs, &mut stack)?;
        }

        if let Some(row) = file.row_struct {
            if !staged.structs.contains_key(&row) {
                return Err(SchemaError::no_row_struct(Some(&row)));
            }
            staged.row_struct = Some(row);
        }

        *self = staged;
        log_event_with_fields(
            Event::SchemaLoaded,
            &[
                ("enums", &self.enums.len().to_string()),
                ("row_struct", self.row_struct.as_deref().unwrap_or("")),
                ("structs", &self.structs.len().to_string()),
            ],
        );
        Ok(())
    }

    /// Registers an enum built in code.
    pub fn register_enum(&mut self, enum_type: EnumType) -> SchemaResult<Arc<EnumType>> {
        let name = enum_type.name().to_string();
        if self.enums.contains_key(&name) || self.structs.contains_key(&name) {
            return Err(SchemaError::duplicate_type(name));
        }
        let shared = Arc::new(enum_type);
        self.enums.insert(name, Arc::clone(&shared));
        Ok(shared)
    }

    /// Registers a record type built in code.
    pub fn register_struct(&mut self, record: RecordType) -> SchemaResult<Arc<RecordType>> {
        let name = record.name().to_string();
        if self.structs.contains_key(&name) || self.enums.contains_key(&name) {
            return Err(SchemaError::duplicate_type(name));
        }
        let shared = Arc::new(record);
        self.structs.insert(name, Arc::clone(&shared));
        Ok(shared)
    }

    /// Names the struct used for table rows.
    pub fn set_row_struct(&mut self, name: impl Into<String>) -> SchemaResult<()> {
        let name = name.into();
        if !self.structs.contains_key(&name) {
            return Err(SchemaError::no_row_struct(Some(&name)));
        }
        self.row_struct = Some(name);
        Ok(())
    }

    /// Returns the row struct, or an error if none was named.
    pub fn row_struct(&self) -> SchemaResult<Arc<RecordType>> {
        let name = self
            .row_struct
            .as_deref()
            .ok_or_else(|| SchemaError::no_row_struct(None))?;
        self.get_struct(name)
            .ok_or_else(|| SchemaError::no_row_struct(Some(name)))
    }

    pub fn get_struct(&self, name: &str) -> Option<Arc<RecordType>> {
        self.structs.get(name).cloned()
    }

    pub fn get_enum(&self, name: &str) -> Option<Arc<EnumType>> {
        self.enums.get(name).cloned()
    }

    /// Returns the number of registered structs.
    pub fn struct_count(&self) -> usize {
        self.structs.len()
    }

    /// Returns the number of registered enums.
    pub fn enum_count(&self) -> usize {
        self.enums.len()
    }

    fn resolve_struct(
        &mut self,
        name: &str,
        defs: &HashMap<&str, &StructDef>,
        stack: &mut Vec<String>,
    ) -> SchemaResult<Arc<RecordType>> {
        if let Some(done) = self.structs.get(name) {
            return Ok(Arc::clone(done));
        }
        if stack.iter().any(|s| s == name) {
            let mut path = stack.clone();
            path.push(name.to_string());
            return Err(SchemaError::cycle(&path));
        }
        let def = match defs.get(name) {
            Some(def) => *def,
            None => return Err(SchemaError::no_row_struct(Some(name))),
        };

        stack.push(name.to_string());
        let mut fields = Vec::with_capacity(def.fields.len());
        for field in &def.fields {
            if field.name.is_empty() {
                return Err(SchemaError::invalid_field(name, "<unnamed>", "field name is empty"));
            }
            if field.arity == 0 {
                return Err(SchemaError::invalid_field(name, &field.name, "arity must be at least 1"));
            }
            let kind = self.resolve_type(name, &field.name, &field.field_type, defs, stack)?;
            let mut descriptor = FieldDescriptor::new(&field.name, kind).with_arity(field.arity);
            for alias in &field.aliases {
                descriptor = descriptor.with_alias(alias);
            }
            if field.optional {
                descriptor = descriptor.optional_for_import();
            }
            fields.push(descriptor);
        }
        stack.pop();

        self.register_struct(RecordType::new(name, fields))
    }

    fn resolve_type(
        &mut self,
        owner: &str,
        field: &str,
        def: &FieldTypeDef,
        defs: &HashMap<&str, &StructDef>,
        stack: &mut Vec<String>,
    ) -> SchemaResult<FieldKind> {
        let kind = match def {
            FieldTypeDef::Bool => FieldKind::Bool,
            FieldTypeDef::Int { width, enum_name } => FieldKind::Int {
                width: *width,
                enum_type: match enum_name {
                    Some(e) => Some(self.lookup_enum(owner, field, e)?),
                    None => None,
                },
            },
            FieldTypeDef::Float { width } => FieldKind::Float(*width),
            FieldTypeDef::Enum { enum_name } => {
                FieldKind::Enum(self.lookup_enum(owner, field, enum_name)?)
            }
            FieldTypeDef::String => FieldKind::String,
            FieldTypeDef::Name => FieldKind::Name,
            FieldTypeDef::Array { inner } => {
                let inner = self.resolve_type(owner, field, inner, defs, stack)?;
                FieldKind::Array(Box::new(FieldDescriptor::new(field, inner)))
            }
            FieldTypeDef::Set { inner } => {
                let inner = self.resolve_type(owner, field, inner, defs, stack)?;
                FieldKind::Set(Box::new(FieldDescriptor::new(field, inner)))
            }
            FieldTypeDef::Map { key, value } => {
                let key = self.resolve_type(owner, field, key, defs, stack)?;
                let value = self.resolve_type(owner, field, value, defs, stack)?;
                FieldKind::Map {
                    key: Box::new(FieldDescriptor::new(field, key)),
                    value: Box::new(FieldDescriptor::new(field, value)),
                }
            }
            FieldTypeDef::Struct { struct_name } => {
                if !self.structs.contains_key(struct_name) && !defs.contains_key(struct_name.as_str()) {
                    return Err(SchemaError::unknown_type(owner, field, struct_name));
                }
                FieldKind::Struct(self.resolve_struct(struct_name, defs, stack)?)
            }
        };
        Ok(kind)
    }

    fn lookup_enum(&self, owner: &str, field: &str, name: &str) -> SchemaResult<Arc<EnumType>> {
        self.get_enum(name)
            .ok_or_else(|| SchemaError::unknown_type(owner, field, name))
    }
}

fn build_enum(def: &EnumDef) -> EnumType {
    let mut next = 0i64;
    let symbols = def
        .symbols
        .iter()
        .map(|s| {
            let (name, value) = match s {
                SymbolDef::Implicit(name) => (name.clone(), next),
                SymbolDef::Explicit { name, value } => (name.clone(), *value),
            };
            next = value.wrapping_add(1);
            EnumSymbol { name, value }
        })
        .collect();
    EnumType::with_values(&def.name, symbols)
}
