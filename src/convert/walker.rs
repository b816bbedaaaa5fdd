//! Property-tree walker (import direction)
//!
//! `read_struct` fills one record instance from one JSON object, field by
//! field. Each value goes through the entry codec in one of two contexts:
//!
//! - field context: the value of a declared field. Arrays, sets and maps
//!   are decoded here.
//! - entry context: an element of an array, set, map or fixed-size array.
//!   Containers are rejected so nesting stops at one level.
//!
//! Structs recurse in both contexts. Failures are appended to the problem
//! log and reported as `false`; only a fixed-size array field whose value is
//! not a JSON array makes `read_struct` itself fail.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::record::{
    assign_from_string, enum_value, int_in_width, parse_text, CoercionError, FieldValue, MapValue,
    RecordInstance, SetValue,
};
use crate::schema::{FieldDescriptor, FieldKind, FloatWidth};

use super::json::{json_kind_name, json_to_bool, json_to_f64, json_to_i64};
use super::problems::ProblemLog;

/// Where a value sits, for dispatch and for messages
#[derive(Debug, Clone, Copy)]
struct Cell<'c> {
    row: &'c str,
    column: &'c str,
    entry: Option<usize>,
}

impl Cell<'_> {
    /// Sentence subject: "Property 'c' on row 'r'" or "Entry i on property ..."
    fn subject(&self) -> String {
        match self.entry {
            None => format!("Property '{}' on row '{}'", self.column, self.row),
            Some(i) => format!("Entry {} on property '{}' on row '{}'", i, self.column, self.row),
        }
    }

    /// Sentence object: "property 'c' on row 'r'" or "entry i on property ..."
    fn target(&self) -> String {
        match self.entry {
            None => format!("property '{}' on row '{}'", self.column, self.row),
            Some(i) => format!("entry {} on property '{}' on row '{}'", i, self.column, self.row),
        }
    }
}

pub struct StructWalker<'a> {
    problems: &'a mut ProblemLog,
    ignore_missing_fields: bool,
    reparse_string_values: bool,
}

impl<'a> StructWalker<'a> {
    pub fn new(problems: &'a mut ProblemLog) -> Self {
        Self {
            problems,
            ignore_missing_fields: false,
            reparse_string_values: true,
        }
    }

    /// Do not report declared fields that have no JSON value.
    pub fn ignore_missing_fields(mut self, ignore: bool) -> Self {
        self.ignore_missing_fields = ignore;
        self
    }

    /// Retry a failed field once with its string value parsed as JSON.
    pub fn reparse_string_values(mut self, reparse: bool) -> Self {
        self.reparse_string_values = reparse;
        self
    }

    /// Populates `instance` from `object`, in field declaration order.
    pub fn read_struct(
        &mut self,
        object: &Map<String, Value>,
        instance: &mut RecordInstance,
        row: &str,
    ) -> bool {
        let record_type = Arc::clone(instance.record_type());
        for (field_index, field) in record_type.fields().iter().enumerate() {
            let column = field.export_name();

            let Some(value) = field.import_names().into_iter().find_map(|n| object.get(n)) else {
                if !field.is_optional_for_import() && !self.ignore_missing_fields {
                    self.problems.push(format!(
                        "Row '{}' is missing an entry for '{}'.",
                        row, column
                    ));
                }
                continue;
            };

            if !field.is_static_array() {
                if let Some(slot) = instance.get_mut(field_index, 0) {
                    self.read_field(value, row, column, field, slot);
                }
                continue;
            }

            let Value::Array(items) = value else {
                self.problems.push(format!(
                    "Property '{}' on row '{}' is the incorrect type. Expected Array, got {}.",
                    column,
                    row,
                    json_kind_name(value)
                ));
                return false;
            };

            if items.len() != field.arity() {
                self.problems.push(format!(
                    "Property '{}' on row '{}' is a static sized array with {} elements, but we have {} values to import",
                    column,
                    row,
                    field.arity(),
                    items.len()
                ));
            }

            for (index, item) in items.iter().take(field.arity()).enumerate() {
                if let Some(slot) = instance.get_mut(field_index, index) {
                    self.read_container_entry(item, row, column, index, field, slot);
                }
            }
        }
        true
    }

    /// Decodes the value of a declared field into `slot`.
    pub fn read_struct_entry(
        &mut self,
        value: &Value,
        row: &str,
        column: &str,
        field: &FieldDescriptor,
        slot: &mut FieldValue,
    ) -> bool {
        let cell = Cell {
            row,
            column,
            entry: None,
        };
        self.read_entry(value, cell, field, slot)
    }

    /// Decodes element `index` of a container or fixed-size array into `slot`.
    pub fn read_container_entry(
        &mut self,
        value: &Value,
        row: &str,
        column: &str,
        index: usize,
        field: &FieldDescriptor,
        slot: &mut FieldValue,
    ) -> bool {
        let cell = Cell {
            row,
            column,
            entry: Some(index),
        };
        self.read_entry(value, cell, field, slot)
    }

    /// Field-context read with the double-encoded string fallback.
    ///
    /// Problems of a failed first attempt are dropped when the retry on the
    /// embedded JSON succeeds.
    fn read_field(
        &mut self,
        value: &Value,
        row: &str,
        column: &str,
        field: &FieldDescriptor,
        slot: &mut FieldValue,
    ) -> bool {
        let Value::String(text) = value else {
            return self.read_struct_entry(value, row, column, field, slot);
        };
        if !self.reparse_string_values {
            return self.read_struct_entry(value, row, column, field, slot);
        }

        let (ok, first) = self.attempt(|w| w.read_struct_entry(value, row, column, field, slot));
        if ok {
            self.problems.absorb(first);
            return true;
        }

        let Ok(embedded) = serde_json::from_str::<Value>(text) else {
            self.problems.absorb(first);
            return false;
        };
        let (ok, second) =
            self.attempt(|w| w.read_struct_entry(&embedded, row, column, field, slot));
        if ok {
            self.problems.absorb(second);
        } else {
            self.problems.absorb(first);
        }
        ok
    }

    /// Runs `read` against a scratch problem log and hands that log back.
    fn attempt<F>(&mut self, read: F) -> (bool, ProblemLog)
    where
        F: FnOnce(&mut Self) -> bool,
    {
        let mut scratch = ProblemLog::scratch();
        std::mem::swap(&mut *self.problems, &mut scratch);
        let ok = read(self);
        std::mem::swap(&mut *self.problems, &mut scratch);
        (ok, scratch)
    }

    fn read_entry(
        &mut self,
        value: &Value,
        cell: Cell<'_>,
        field: &FieldDescriptor,
        slot: &mut FieldValue,
    ) -> bool {
        match field.kind() {
            FieldKind::Enum(enum_type) => {
                if let Value::String(symbol) = value {
                    match enum_value(symbol, enum_type) {
                        Some(v) => {
                            *slot = FieldValue::Enum(v);
                            true
                        }
                        None => self.invalid_enum(cell, symbol),
                    }
                } else {
                    match json_to_i64(value) {
                        Some(v) => {
                            *slot = FieldValue::Enum(v);
                            true
                        }
                        None => self.incorrect_type(cell, "Integer", value),
                    }
                }
            }

            FieldKind::Int { width, enum_type } => {
                if let (Some(_), Value::String(symbol)) = (enum_type, value) {
                    return match parse_text(symbol, field) {
                        Ok(v) => {
                            *slot = v;
                            true
                        }
                        Err(_) => self.invalid_enum(cell, symbol),
                    };
                }
                let Some(v) = json_to_i64(value) else {
                    return self.incorrect_type(cell, "Integer", value);
                };
                match int_in_width(v, *width) {
                    Ok(v) => {
                        *slot = FieldValue::Int(v);
                        true
                    }
                    Err(e) => self.assign_failed(cell, "value", &v.to_string(), &e),
                }
            }

            FieldKind::Float(width) => {
                let Some(v) = json_to_f64(value) else {
                    return self.incorrect_type(cell, "Double", value);
                };
                let narrowed = width.narrow(v);
                if narrowed.is_infinite() && *width == FloatWidth::F32 {
                    let err = CoercionError::OutOfRange {
                        value: v.to_string(),
                        width: width.name(),
                    };
                    return self.assign_failed(cell, "value", &v.to_string(), &err);
                }
                *slot = FieldValue::Float(narrowed);
                true
            }

            FieldKind::Bool => match json_to_bool(value) {
                Some(b) => {
                    *slot = FieldValue::Bool(b);
                    true
                }
                None => self.incorrect_type(cell, "Boolean", value),
            },

            FieldKind::Array(inner) => {
                if cell.entry.is_some() {
                    return self.cannot_nest(cell, "arrays");
                }
                let Value::Array(items) = value else {
                    return self.incorrect_type(cell, "Array", value);
                };
                let mut elements = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let mut element = FieldValue::default_for(inner.kind());
                    self.read_container_entry(item, cell.row, cell.column, index, inner, &mut element);
                    elements.push(element);
                }
                *slot = FieldValue::Array(elements);
                true
            }

            FieldKind::Set(inner) => {
                if cell.entry.is_some() {
                    return self.cannot_nest(cell, "sets");
                }
                let Value::Array(items) = value else {
                    return self.incorrect_type(cell, "Array", value);
                };
                if !matches!(slot, FieldValue::Set(_)) {
                    *slot = FieldValue::Set(SetValue::new());
                }
                let FieldValue::Set(set) = slot else {
                    return false;
                };
                set.empty();
                for (index, item) in items.iter().enumerate() {
                    let added = set.add_unhashed(FieldValue::default_for(inner.kind()));
                    if let Some(element) = set.element_mut(added) {
                        self.read_container_entry(item, cell.row, cell.column, index, inner, element);
                    }
                }
                set.rehash();
                true
            }

            FieldKind::Map { key, value: inner } => {
                if cell.entry.is_some() {
                    return self.cannot_nest(cell, "maps");
                }
                let Value::Object(entries) = value else {
                    return self.incorrect_type(cell, "Object", value);
                };
                if !matches!(slot, FieldValue::Map(_)) {
                    *slot = FieldValue::Map(MapValue::new());
                }
                let FieldValue::Map(map) = slot else {
                    return false;
                };
                map.empty();
                let ok = self.read_map_entries(entries, cell, key, inner, map);
                map.rehash();
                ok
            }

            FieldKind::Struct(_) => match value {
                Value::Object(object) => {
                    if !slot.fits(field.kind()) {
                        *slot = FieldValue::default_for(field.kind());
                    }
                    match slot.as_struct_mut() {
                        Some(instance) => self.read_struct(object, instance, cell.row),
                        None => false,
                    }
                }
                Value::String(text) => match assign_from_string(text, field, slot) {
                    Ok(()) => true,
                    Err(e) => self.assign_failed(cell, "string", text, &e),
                },
                other => self.incorrect_type(cell, "String", other),
            },

            FieldKind::String | FieldKind::Name => {
                let Value::String(text) = value else {
                    return self.incorrect_type(cell, "String", value);
                };
                match assign_from_string(text, field, slot) {
                    Ok(()) => true,
                    Err(e) => self.assign_failed(cell, "string", text, &e),
                }
            }
        }
    }

    /// Adds one entry per JSON member in document order, rehashing once at
    /// the end. A bad key or value removes its entry and fails the field.
    fn read_map_entries(
        &mut self,
        entries: &Map<String, Value>,
        cell: Cell<'_>,
        key: &FieldDescriptor,
        value: &FieldDescriptor,
        map: &mut MapValue,
    ) -> bool {
        for (index, (key_text, item)) in entries.iter().enumerate() {
            let added = map.add_unhashed(
                FieldValue::default_for(key.kind()),
                FieldValue::default_for(value.kind()),
            );

            let parsed_key = if key.kind().is_container() {
                Err(CoercionError::NestedContainer(key.kind().kind_name()))
            } else {
                parse_text(key_text, key)
            };
            match parsed_key {
                Ok(k) => {
                    if let Some((key_slot, _)) = map.entry_mut(added) {
                        *key_slot = k;
                    }
                }
                Err(e) => {
                    map.remove_at(added);
                    self.problems.push(format!(
                        "Problem assigning key '{}' to {} : {}",
                        key_text,
                        cell.target(),
                        e
                    ));
                    return false;
                }
            }

            let read = match map.entry_mut(added) {
                Some((_, value_slot)) => {
                    self.read_container_entry(item, cell.row, cell.column, index, value, value_slot)
                }
                None => false,
            };
            if !read {
                map.remove_at(added);
                return false;
            }
        }
        true
    }

    fn incorrect_type(&mut self, cell: Cell<'_>, expected: &str, got: &Value) -> bool {
        self.problems.push(format!(
            "{} is the incorrect type. Expected {}, got {}.",
            cell.subject(),
            expected,
            json_kind_name(got)
        ));
        false
    }

    fn invalid_enum(&mut self, cell: Cell<'_>, symbol: &str) -> bool {
        self.problems.push(format!(
            "{} has invalid enum value: {}.",
            cell.subject(),
            symbol
        ));
        false
    }

    fn assign_failed(&mut self, cell: Cell<'_>, what: &str, text: &str, err: &CoercionError) -> bool {
        self.problems.push(format!(
            "Problem assigning {} '{}' to {} : {}",
            what,
            text,
            cell.target(),
            err
        ));
        false
    }

    fn cannot_nest(&mut self, cell: Cell<'_>, what: &str) -> bool {
        self.problems
            .push(format!("{} cannot nest {}.", cell.subject(), what));
        false
    }
}
