//! Record type descriptors
//!
//! Supported field kinds:
//! - bool: Boolean
//! - int: integer-like, optionally tagged as carrying an enum
//! - float: 32/64-bit floating point
//! - enum: enumeration backed by an integer
//! - string / name: string-coercible text fields
//! - array / set / map: one level of container
//! - struct: nested record type

use std::ops::Range;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Storage width of an integer field.
///
/// Values are always held as `i64`; `u64` fields are therefore limited to `i64::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntWidth {
    I8,
    I16,
    I32,
    #[default]
    I64,
    U8,
    U16,
    U32,
    U64,
}

impl IntWidth {
    /// Returns the width name for error messages
    pub fn name(&self) -> &'static str {
        match self {
            IntWidth::I8 => "i8",
            IntWidth::I16 => "i16",
            IntWidth::I32 => "i32",
            IntWidth::I64 => "i64",
            IntWidth::U8 => "u8",
            IntWidth::U16 => "u16",
            IntWidth::U32 => "u32",
            IntWidth::U64 => "u64",
        }
    }

    /// Inclusive range of representable values
    pub fn bounds(&self) -> (i64, i64) {
        match self {
            IntWidth::I8 => (i8::MIN as i64, i8::MAX as i64),
            IntWidth::I16 => (i16::MIN as i64, i16::MAX as i64),
            IntWidth::I32 => (i32::MIN as i64, i32::MAX as i64),
            IntWidth::I64 => (i64::MIN, i64::MAX),
            IntWidth::U8 => (0, u8::MAX as i64),
            IntWidth::U16 => (0, u16::MAX as i64),
            IntWidth::U32 => (0, u32::MAX as i64),
            IntWidth::U64 => (0, i64::MAX),
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        let (min, max) = self.bounds();
        value >= min && value <= max
    }
}

/// Storage width of a floating point field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloatWidth {
    F32,
    #[default]
    F64,
}

impl FloatWidth {
    pub fn name(&self) -> &'static str {
        match self {
            FloatWidth::F32 => "f32",
            FloatWidth::F64 => "f64",
        }
    }

    /// Rounds a double to the precision this width stores.
    pub fn narrow(&self, value: f64) -> f64 {
        match self {
            FloatWidth::F32 => value as f32 as f64,
            FloatWidth::F64 => value,
        }
    }
}

/// One named enumeration symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSymbol {
    pub name: String,
    pub value: i64,
}

/// Enumeration type: an ordered symbol table over integer values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    name: String,
    symbols: Vec<EnumSymbol>,
}

impl EnumType {
    /// Create an enum whose symbols take ordinal values 0, 1, 2, ...
    pub fn new<S: Into<String>>(name: impl Into<String>, symbols: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            symbols: symbols
                .into_iter()
                .enumerate()
                .map(|(i, s)| EnumSymbol {
                    name: s.into(),
                    value: i as i64,
                })
                .collect(),
        }
    }

    /// Create an enum with explicit symbol values
    pub fn with_values(name: impl Into<String>, symbols: Vec<EnumSymbol>) -> Self {
        Self {
            name: name.into(),
            symbols,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbols(&self) -> &[EnumSymbol] {
        &self.symbols
    }

    /// Resolves `Symbol` or `EnumName::Symbol` to its value.
    pub fn value_of(&self, symbol: &str) -> Option<i64> {
        let symbol = symbol.trim();
        let bare = match symbol.split_once("::") {
            Some((prefix, rest)) if prefix == self.name => rest,
            Some(_) => return None,
            None => symbol,
        };
        self.symbols
            .iter()
            .find(|s| s.name == bare)
            .map(|s| s.value)
    }

    /// Returns the first symbol carrying `value`.
    pub fn name_of(&self, value: i64) -> Option<&str> {
        self.symbols
            .iter()
            .find(|s| s.value == value)
            .map(|s| s.name.as_str())
    }

    /// Value a freshly initialized field of this enum holds
    pub fn default_value(&self) -> i64 {
        self.symbols.first().map_or(0, |s| s.value)
    }
}

/// Semantic kind of a field, closed over everything the walker understands.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Boolean
    Bool,
    /// Integer-like. `enum_type` marks a numeric field that represents an enum.
    Int {
        width: IntWidth,
        enum_type: Option<Arc<EnumType>>,
    },
    /// Floating point
    Float(FloatWidth),
    /// Enumeration
    Enum(Arc<EnumType>),
    /// Free text
    String,
    /// Identifier text
    Name,
    /// Dynamic array of `inner`
    Array(Box<FieldDescriptor>),
    /// Hashed set of `inner`
    Set(Box<FieldDescriptor>),
    /// Hashed map from `key` to `value`
    Map {
        key: Box<FieldDescriptor>,
        value: Box<FieldDescriptor>,
    },
    /// Nested record
    Struct(Arc<RecordType>),
}

impl FieldKind {
    /// Returns the kind name for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldKind::Bool => "bool",
            FieldKind::Int { .. } => "int",
            FieldKind::Float(_) => "float",
            FieldKind::Enum(_) => "enum",
            FieldKind::String => "string",
            FieldKind::Name => "name",
            FieldKind::Array(_) => "array",
            FieldKind::Set(_) => "set",
            FieldKind::Map { .. } => "map",
            FieldKind::Struct(_) => "struct",
        }
    }

    /// True for array, set and map kinds
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            FieldKind::Array(_) | FieldKind::Set(_) | FieldKind::Map { .. }
        )
    }

    pub fn int() -> Self {
        FieldKind::Int {
            width: IntWidth::I64,
            enum_type: None,
        }
    }

    pub fn int_of(width: IntWidth) -> Self {
        FieldKind::Int {
            width,
            enum_type: None,
        }
    }

    /// Numeric field carrying an enum, e.g. a byte-sized enum
    pub fn numeric_enum(width: IntWidth, enum_type: Arc<EnumType>) -> Self {
        FieldKind::Int {
            width,
            enum_type: Some(enum_type),
        }
    }

    pub fn float() -> Self {
        FieldKind::Float(FloatWidth::F64)
    }

    pub fn array(inner: FieldKind) -> Self {
        FieldKind::Array(Box::new(FieldDescriptor::new("", inner)))
    }

    pub fn set(inner: FieldKind) -> Self {
        FieldKind::Set(Box::new(FieldDescriptor::new("", inner)))
    }

    pub fn map(key: FieldKind, value: FieldKind) -> Self {
        FieldKind::Map {
            key: Box::new(FieldDescriptor::new("", key)),
            value: Box::new(FieldDescriptor::new("", value)),
        }
    }
}

/// One declared field of a record type
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    name: String,
    kind: FieldKind,
    arity: usize,
    aliases: Vec<String>,
    optional_for_import: bool,
}

impl FieldDescriptor {
    /// Create a scalar (arity 1) field
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        // Container elements answer to their owner's column name.
        let kind = match kind {
            FieldKind::Array(inner) => FieldKind::Array(Box::new(inner.renamed(&name))),
            FieldKind::Set(inner) => FieldKind::Set(Box::new(inner.renamed(&name))),
            FieldKind::Map { key, value } => FieldKind::Map {
                key: Box::new(key.renamed(&name)),
                value: Box::new(value.renamed(&name)),
            },
            other => other,
        };
        Self {
            name,
            kind,
            arity: 1,
            aliases: Vec::new(),
            optional_for_import: false,
        }
    }

    /// Make this a fixed-size array of `arity` elements
    pub fn with_arity(mut self, arity: usize) -> Self {
        self.arity = arity.max(1);
        self
    }

    /// Add an accepted import name
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Mark the field as optional on import (no missing-entry problem)
    pub fn optional_for_import(mut self) -> Self {
        self.optional_for_import = true;
        self
    }

    fn renamed(mut self, name: &str) -> Self {
        if self.name.is_empty() {
            self.name = name.to_string();
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column id used on export
    pub fn export_name(&self) -> &str {
        &self.name
    }

    /// Names accepted on import: export name first, then aliases.
    pub fn import_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::with_capacity(self.aliases.len() + 1);
        names.push(&self.name);
        for alias in &self.aliases {
            if !names.contains(&alias.as_str()) {
                names.push(alias);
            }
        }
        names
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Static array dimension; 1 for everything but fixed-size arrays
    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn is_static_array(&self) -> bool {
        self.arity > 1
    }

    pub fn is_optional_for_import(&self) -> bool {
        self.optional_for_import
    }

    /// True when `name` is one of this field's import names
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|a| a == name)
    }
}

/// A record type: ordered fields plus the slot layout instances use.
#[derive(Debug, Clone)]
pub struct RecordType {
    name: String,
    fields: Vec<FieldDescriptor>,
    offsets: Vec<usize>,
    slot_count: usize,
}

impl RecordType {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        let mut offsets = Vec::with_capacity(fields.len());
        let mut slot_count = 0;
        for field in &fields {
            offsets.push(slot_count);
            slot_count += field.arity();
        }
        Self {
            name: name.into(),
            fields,
            offsets,
            slot_count,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&FieldDescriptor> {
        self.fields.get(index)
    }

    /// Total number of value slots an instance holds
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Slots occupied by field `index`
    pub fn slot_range(&self, index: usize) -> Option<Range<usize>> {
        let start = *self.offsets.get(index)?;
        let arity = self.fields.get(index)?.arity();
        Some(start..start + arity)
    }

    /// Finds a field by export name
    pub fn find_field(&self, name: &str) -> Option<(usize, &FieldDescriptor)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, f)| f.export_name() == name)
    }

    /// Finds a field by export name or any import alias
    pub fn find_by_import_name(&self, name: &str) -> Option<(usize, &FieldDescriptor)> {
        self.find_field(name)
            .or_else(|| self.fields.iter().enumerate().find(|(_, f)| f.answers_to(name)))
    }
}
