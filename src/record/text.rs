//! Text coercion for field values
//!
//! The text form is what a cell holds when a value arrives as a plain
//! string, and what non-JSON-native values export as:
//!
//! - scalars: `True`, `42`, `1.5`, `Rare`, `hello`
//! - structs: `(Level=3,Title="Iron Sword",Stats=(Power=1.5))`
//! - static array elements in structs: `Scores[1]=2.5`
//! - arrays and sets: `(a,b,c)`
//! - maps: `((key,value),(key,value))`
//!
//! Inside a group, strings may be quoted with `\"`, `\\`, `\n`, `\r`, `\t` escapes.
//! Containers cannot hold containers.

use std::fmt::Write as _;
use std::sync::Arc;

use thiserror::Error;

use crate::schema::{EnumType, FieldDescriptor, FieldKind, FloatWidth, IntWidth, RecordType};

use super::instance::RecordInstance;
use super::value::{FieldValue, MapValue, SetValue};

/// Characters that may not appear in a name value or a row name
pub const INVALID_NAME_CHARS: &str = "\"' ,/.:|&!~@#(){}[]=;^%$`";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    #[error("'{text}' is not a valid {expected}")]
    Invalid { text: String, expected: &'static str },

    #[error("value {value} is out of range for {width}")]
    OutOfRange { value: String, width: &'static str },

    #[error("'{symbol}' is not a value of enum {enum_name}")]
    UnknownSymbol { symbol: String, enum_name: String },

    #[error("'{0}' contains characters that are not allowed in a name")]
    InvalidName(String),

    #[error("struct {struct_name} has no field '{field}'")]
    UnknownField { struct_name: String, field: String },

    #[error("index {index} is out of bounds for field '{field}'")]
    BadIndex { field: String, index: usize },

    #[error("{0} values cannot be nested inside a container")]
    NestedContainer(&'static str),

    #[error("malformed text: {0}")]
    Syntax(String),
}

/// Parses `text` as a value of `field`'s kind without touching any record.
///
/// This is the variant container entries and map keys use.
pub fn parse_text(text: &str, field: &FieldDescriptor) -> Result<FieldValue, CoercionError> {
    parse_kind(text, field.kind(), false, false)
}

/// Parses `text` for `field` and stores it in `slot` only on success.
pub fn assign_from_string(
    text: &str,
    field: &FieldDescriptor,
    slot: &mut FieldValue,
) -> Result<(), CoercionError> {
    *slot = parse_text(text, field)?;
    Ok(())
}

/// Renders a value in text form.
pub fn to_text(value: &FieldValue, field: &FieldDescriptor) -> String {
    let mut out = String::new();
    write_text(&mut out, value, Some(field.kind()), false);
    out
}

/// Converts a raw integer to an integer field value, checking its width.
pub fn int_in_width(value: i64, width: IntWidth) -> Result<i64, CoercionError> {
    if width.contains(value) {
        Ok(value)
    } else {
        Err(CoercionError::OutOfRange {
            value: value.to_string(),
            width: width.name(),
        })
    }
}

/// Checks that `text` is usable as a name.
pub fn validate_name(text: &str) -> Result<(), CoercionError> {
    if text
        .chars()
        .any(|c| c.is_control() || INVALID_NAME_CHARS.contains(c))
    {
        return Err(CoercionError::InvalidName(text.to_string()));
    }
    Ok(())
}

fn parse_kind(
    text: &str,
    kind: &FieldKind,
    grouped: bool,
    in_container: bool,
) -> Result<FieldValue, CoercionError> {
    match kind {
        FieldKind::Bool => parse_bool(&unquote(text)?),
        FieldKind::Int { width, enum_type } => {
            parse_int(&unquote(text)?, *width, enum_type.as_deref())
        }
        FieldKind::Float(width) => parse_float(&unquote(text)?, *width),
        FieldKind::Enum(enum_type) => {
            let symbol = unquote(text)?;
            enum_value(&symbol, enum_type)
                .map(FieldValue::Enum)
                .ok_or_else(|| unknown_symbol(&symbol, enum_type))
        }
        FieldKind::String => {
            if grouped {
                Ok(FieldValue::Str(unquote(text)?))
            } else {
                Ok(FieldValue::Str(text.to_string()))
            }
        }
        FieldKind::Name => {
            let name = if grouped { unquote(text)? } else { text.trim().to_string() };
            validate_name(&name)?;
            Ok(FieldValue::Str(name))
        }
        FieldKind::Array(inner) => {
            if in_container {
                return Err(CoercionError::NestedContainer("array"));
            }
            let mut items = Vec::new();
            for item in split_group(text)? {
                items.push(parse_kind(item, inner.kind(), true, true)?);
            }
            Ok(FieldValue::Array(items))
        }
        FieldKind::Set(inner) => {
            if in_container {
                return Err(CoercionError::NestedContainer("set"));
            }
            let mut set = SetValue::new();
            for item in split_group(text)? {
                set.add_unhashed(parse_kind(item, inner.kind(), true, true)?);
            }
            set.rehash();
            Ok(FieldValue::Set(set))
        }
        FieldKind::Map { key, value } => {
            if in_container {
                return Err(CoercionError::NestedContainer("map"));
            }
            let mut map = MapValue::new();
            for item in split_group(text)? {
                let pair = split_group(item)?;
                if pair.len() != 2 {
                    return Err(CoercionError::Syntax(format!(
                        "map entry '{}' must be a (key,value) pair",
                        item
                    )));
                }
                let k = parse_kind(pair[0], key.kind(), true, true)?;
                let v = parse_kind(pair[1], value.kind(), true, true)?;
                map.add_unhashed(k, v);
            }
            map.rehash();
            Ok(FieldValue::Map(map))
        }
        FieldKind::Struct(record) => parse_struct(text, record).map(FieldValue::Struct),
    }
}

fn parse_struct(text: &str, record: &Arc<RecordType>) -> Result<RecordInstance, CoercionError> {
    let mut instance = RecordInstance::new(Arc::clone(record));
    for item in split_group(text)? {
        let eq = top_level_positions(item, '=')?
            .first()
            .copied()
            .ok_or_else(|| CoercionError::Syntax(format!("expected 'Field=Value', got '{}'", item)))?;
        let (key, raw) = (item[..eq].trim(), &item[eq + 1..]);

        let (name, index) = match key.split_once('[') {
            Some((name, rest)) => {
                let digits = rest.strip_suffix(']').ok_or_else(|| {
                    CoercionError::Syntax(format!("unterminated index in '{}'", key))
                })?;
                let index = digits.trim().parse::<usize>().map_err(|_| CoercionError::Invalid {
                    text: digits.to_string(),
                    expected: "array index",
                })?;
                (name.trim(), index)
            }
            None => (key, 0),
        };

        let (field_index, descriptor) =
            record
                .find_by_import_name(name)
                .ok_or_else(|| CoercionError::UnknownField {
                    struct_name: record.name().to_string(),
                    field: name.to_string(),
                })?;
        let value = parse_kind(raw, descriptor.kind(), true, false)?;
        let slot = instance
            .get_mut(field_index, index)
            .ok_or_else(|| CoercionError::BadIndex {
                field: name.to_string(),
                index,
            })?;
        *slot = value;
    }
    Ok(instance)
}

fn parse_bool(text: &str) -> Result<FieldValue, CoercionError> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(FieldValue::Bool(true)),
        "false" | "no" | "0" => Ok(FieldValue::Bool(false)),
        _ => Err(CoercionError::Invalid {
            text: text.to_string(),
            expected: "boolean",
        }),
    }
}

/// Value of `text` as a symbol of `enum_type`, else as a plain integer.
///
/// Values with no symbol are written as numbers, so they read back here.
pub fn enum_value(text: &str, enum_type: &EnumType) -> Option<i64> {
    let trimmed = text.trim();
    enum_type
        .value_of(trimmed)
        .or_else(|| trimmed.parse::<i64>().ok())
}

fn parse_int(
    text: &str,
    width: IntWidth,
    enum_type: Option<&EnumType>,
) -> Result<FieldValue, CoercionError> {
    let trimmed = text.trim();
    if let Ok(wide) = trimmed.parse::<i128>() {
        let value = i64::try_from(wide).map_err(|_| CoercionError::OutOfRange {
            value: trimmed.to_string(),
            width: width.name(),
        })?;
        return int_in_width(value, width).map(FieldValue::Int);
    }
    match enum_type {
        Some(e) => {
            let value = e.value_of(trimmed).ok_or_else(|| unknown_symbol(trimmed, e))?;
            int_in_width(value, width).map(FieldValue::Int)
        }
        None => Err(CoercionError::Invalid {
            text: text.to_string(),
            expected: "integer",
        }),
    }
}

fn parse_float(text: &str, width: FloatWidth) -> Result<FieldValue, CoercionError> {
    text.trim()
        .parse::<f64>()
        .map(|v| FieldValue::Float(width.narrow(v)))
        .map_err(|_| CoercionError::Invalid {
            text: text.to_string(),
            expected: "number",
        })
}

fn unknown_symbol(symbol: &str, enum_type: &EnumType) -> CoercionError {
    CoercionError::UnknownSymbol {
        symbol: symbol.to_string(),
        enum_name: enum_type.name().to_string(),
    }
}

/// Byte offsets of `delim` outside quotes and parentheses.
fn top_level_positions(text: &str, delim: char) -> Result<Vec<usize>, CoercionError> {
    let mut positions = Vec::new();
    let mut depth = 0i32;
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if in_quotes {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_quotes = false;
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(CoercionError::Syntax(format!("unbalanced ')' in '{}'", text)));
                }
            }
            c if c == delim && depth == 0 => positions.push(i),
            _ => {}
        }
    }
    if in_quotes {
        return Err(CoercionError::Syntax(format!("unterminated string in '{}'", text)));
    }
    if depth != 0 {
        return Err(CoercionError::Syntax(format!("unbalanced '(' in '{}'", text)));
    }
    Ok(positions)
}

/// Splits `(a,b,c)` into its trimmed top-level items.
fn split_group(text: &str) -> Result<Vec<&str>, CoercionError> {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| CoercionError::Syntax(format!("expected '(...)', got '{}'", trimmed)))?;
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut items = Vec::new();
    let mut start = 0;
    for pos in top_level_positions(inner, ',')? {
        items.push(inner[start..pos].trim());
        start = pos + 1;
    }
    let last = inner[start..].trim();
    if !last.is_empty() {
        items.push(last);
    }
    Ok(items)
}

/// Strips surrounding quotes and resolves escapes; bare text is trimmed.
fn unquote(text: &str) -> Result<String, CoercionError> {
    let trimmed = text.trim();
    let Some(body) = trimmed.strip_prefix('"') else {
        return Ok(trimmed.to_string());
    };
    let body = body
        .strip_suffix('"')
        .ok_or_else(|| CoercionError::Syntax(format!("unterminated string {}", trimmed)))?;

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => {
                return Err(CoercionError::Syntax(format!("dangling escape in {}", trimmed)));
            }
        }
    }
    Ok(out)
}

fn quote(out: &mut String, text: &str) {
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
}

fn write_text(out: &mut String, value: &FieldValue, kind: Option<&FieldKind>, grouped: bool) {
    match value {
        FieldValue::Bool(b) => out.push_str(if *b { "True" } else { "False" }),
        FieldValue::Int(v) => match kind {
            Some(FieldKind::Int {
                enum_type: Some(e), ..
            }) => match e.name_of(*v) {
                Some(symbol) => out.push_str(symbol),
                None => {
                    let _ = write!(out, "{}", v);
                }
            },
            _ => {
                let _ = write!(out, "{}", v);
            }
        },
        FieldValue::Float(v) => {
            let _ = write!(out, "{}", v);
        }
        FieldValue::Enum(v) => match kind {
            Some(FieldKind::Enum(e)) => match e.name_of(*v) {
                Some(symbol) => out.push_str(symbol),
                None => {
                    let _ = write!(out, "{}", v);
                }
            },
            _ => {
                let _ = write!(out, "{}", v);
            }
        },
        FieldValue::Str(s) => {
            if grouped {
                quote(out, s);
            } else {
                out.push_str(s);
            }
        }
        FieldValue::Array(items) => {
            let inner = match kind {
                Some(FieldKind::Array(inner)) => Some(inner.kind()),
                _ => None,
            };
            write_list(out, items.iter(), inner);
        }
        FieldValue::Set(set) => {
            let inner = match kind {
                Some(FieldKind::Set(inner)) => Some(inner.kind()),
                _ => None,
            };
            write_list(out, set.iter(), inner);
        }
        FieldValue::Map(map) => {
            let (key_kind, value_kind) = match kind {
                Some(FieldKind::Map { key, value }) => (Some(key.kind()), Some(value.kind())),
                _ => (None, None),
            };
            out.push('(');
            for (i, (k, v)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push('(');
                write_text(out, k, key_kind, true);
                out.push(',');
                write_text(out, v, value_kind, true);
                out.push(')');
            }
            out.push(')');
        }
        FieldValue::Struct(instance) => write_struct(out, instance),
    }
}

fn write_list<'a>(
    out: &mut String,
    items: impl Iterator<Item = &'a FieldValue>,
    inner: Option<&FieldKind>,
) {
    out.push('(');
    for (i, item) in items.enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_text(out, item, inner, true);
    }
    out.push(')');
}

fn write_struct(out: &mut String, instance: &RecordInstance) {
    let record = Arc::clone(instance.record_type());
    out.push('(');
    let mut first = true;
    for (field_index, field) in record.fields().iter().enumerate() {
        let Some(elements) = instance.elements(field_index) else {
            continue;
        };
        for (i, element) in elements.iter().enumerate() {
            if !first {
                out.push(',');
            }
            first = false;
            out.push_str(field.export_name());
            if field.is_static_array() {
                let _ = write!(out, "[{}]", i);
            }
            out.push('=');
            write_text(out, element, Some(field.kind()), true);
        }
    }
    out.push(')');
}
