//! Table export: rows to a Gridly JSON document
//!
//! Each row becomes `{ "id": name, "cells": [{ "columnId", "value" }...], "path": text }`.
//! The configured path field is lifted out of the cells into `path`.
//! Scalars map to JSON scalars, enums to their symbol names (or their
//! number when no symbol matches), containers
//! and structs to JSON arrays and objects. Elements inside containers go
//! through the entry encoder, which refuses nested containers.
//!
//! With `stringify_nested`, a container or struct cell is written as JSON
//! text inside a string, the form the importer's reparse fallback reads.
//! Fixed-size arrays always stay JSON arrays.

use serde_json::{json, Map, Value};

use crate::observability::{log_event_with_fields, Event};
use crate::record::{to_text, FieldValue, RecordInstance};
use crate::schema::{FieldDescriptor, FieldKind};
use crate::table::{DataTable, RowName};

use super::errors::{ConvertError, ConvertResult};
use super::json::f64_to_json;
use super::options::ExportOptions;
use super::problems::ProblemLog;

pub struct TableExporter<'a> {
    table: &'a DataTable,
    problems: &'a mut ProblemLog,
    options: ExportOptions,
}

impl<'a> TableExporter<'a> {
    pub fn new(table: &'a DataTable, problems: &'a mut ProblemLog) -> Self {
        Self {
            table,
            problems,
            options: ExportOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    /// Serializes rows `[start, start + max)` as a JSON document.
    ///
    /// A start past the last row yields an empty array.
    pub fn export_table(&mut self, start: usize, max: usize) -> ConvertResult<String> {
        let result = self.export_rows(start, max).and_then(|rows| {
            let document = Value::Array(rows);
            let text = if self.options.pretty {
                serde_json::to_string_pretty(&document)
            } else {
                serde_json::to_string(&document)
            };
            text.map_err(ConvertError::json_write)
        });

        if let Err(err) = &result {
            self.problems.push(err.message());
            log_event_with_fields(
                Event::ExportFailed,
                &[("code", err.code().code()), ("message", err.message())],
            );
        }
        result
    }

    /// Builds the row objects of rows `[start, start + max)`.
    pub fn export_rows(&mut self, start: usize, max: usize) -> ConvertResult<Vec<Value>> {
        let Some(record_type) = self.table.row_struct() else {
            return Err(ConvertError::no_row_struct());
        };
        log_event_with_fields(
            Event::ExportBegin,
            &[
                ("max", &max.to_string()),
                ("start", &start.to_string()),
                ("struct", record_type.name()),
            ],
        );

        let table = self.table;
        let mut rows = Vec::new();
        for (name, row) in table.page(start, max) {
            rows.push(self.export_row(name, row)?);
        }

        log_event_with_fields(
            Event::ExportComplete,
            &[
                ("problems", &self.problems.len().to_string()),
                ("rows", &rows.len().to_string()),
                ("total_rows", &table.len().to_string()),
            ],
        );
        Ok(rows)
    }

    /// Builds one `{id, cells, path}` row object.
    pub fn export_row(&mut self, name: &RowName, row: &RecordInstance) -> ConvertResult<Value> {
        let record_type = std::sync::Arc::clone(row.record_type());
        let row_name = name.as_str();
        let mut cells = Vec::new();
        let mut path = String::new();

        for (field_index, field) in record_type.fields().iter().enumerate() {
            let column = field.export_name();
            let Some(elements) = row.elements(field_index) else {
                continue;
            };

            if column == self.options.path_field {
                if let Some(first) = elements.first() {
                    path = to_text(first, field);
                }
                continue;
            }
            if !self.options.exports_column(column) {
                continue;
            }

            let value = if field.is_static_array() {
                Value::Array(
                    elements
                        .iter()
                        .enumerate()
                        .map(|(i, element)| self.write_container_entry(element, field, row_name, column, i))
                        .collect(),
                )
            } else {
                match elements.first() {
                    Some(element) => self.write_struct_entry(element, field, row_name, column),
                    None => Value::Null,
                }
            };

            let value = match value {
                Value::Array(_) | Value::Object(_)
                    if self.options.stringify_nested && !field.is_static_array() =>
                {
                    Value::String(serde_json::to_string(&value).map_err(ConvertError::json_write)?)
                }
                other => other,
            };

            cells.push(json!({ "columnId": column, "value": value }));
        }

        let mut object = Map::new();
        object.insert("id".into(), Value::String(row_name.to_string()));
        object.insert("cells".into(), Value::Array(cells));
        object.insert("path".into(), Value::String(path));
        Ok(Value::Object(object))
    }

    /// Encodes the value of a declared field.
    pub fn write_struct_entry(
        &mut self,
        value: &FieldValue,
        field: &FieldDescriptor,
        row: &str,
        column: &str,
    ) -> Value {
        match (field.kind(), value) {
            (FieldKind::Array(inner), FieldValue::Array(items)) => Value::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.write_container_entry(item, inner, row, column, i))
                    .collect(),
            ),
            (FieldKind::Set(inner), FieldValue::Set(set)) => Value::Array(
                set.iter()
                    .enumerate()
                    .map(|(i, item)| self.write_container_entry(item, inner, row, column, i))
                    .collect(),
            ),
            (FieldKind::Map { key, value: inner }, FieldValue::Map(map)) => {
                let mut object = Map::new();
                for (i, (k, v)) in map.iter().enumerate() {
                    let key_text = to_text(k, key);
                    let encoded = self.write_container_entry(v, inner, row, column, i);
                    object.insert(key_text, encoded);
                }
                Value::Object(object)
            }
            _ => self.write_scalar(value, field, row, column, None),
        }
    }

    /// Encodes element `index` of a container or fixed-size array.
    pub fn write_container_entry(
        &mut self,
        value: &FieldValue,
        field: &FieldDescriptor,
        row: &str,
        column: &str,
        index: usize,
    ) -> Value {
        if let Some(what) = nested_label(field.kind()) {
            self.problems.push(format!(
                "Entry {} on property '{}' on row '{}' cannot nest {}.",
                index, column, row, what
            ));
            return Value::Null;
        }
        self.write_scalar(value, field, row, column, Some(index))
    }

    fn write_scalar(
        &mut self,
        value: &FieldValue,
        field: &FieldDescriptor,
        row: &str,
        column: &str,
        index: Option<usize>,
    ) -> Value {
        match (field.kind(), value) {
            (FieldKind::Bool, FieldValue::Bool(b)) => Value::Bool(*b),
            (FieldKind::Int { enum_type: None, .. }, FieldValue::Int(v)) => Value::from(*v),
            // Enum values without a symbol stay numbers
            (FieldKind::Int { enum_type: Some(e), .. }, FieldValue::Int(v))
            | (FieldKind::Enum(e), FieldValue::Enum(v))
                if e.name_of(*v).is_none() =>
            {
                Value::from(*v)
            }
            (FieldKind::Float(_), FieldValue::Float(v)) => match f64_to_json(*v) {
                Some(number) => number,
                None => {
                    let subject = match index {
                        Some(i) => format!("Entry {} on property '{}' on row '{}'", i, column, row),
                        None => format!("Property '{}' on row '{}'", column, row),
                    };
                    self.problems.push(format!(
                        "{} has a non-finite value {} and was exported as null.",
                        subject, v
                    ));
                    Value::Null
                }
            },
            (FieldKind::Struct(_), FieldValue::Struct(instance)) => self.write_struct(instance, row),
            _ => Value::String(to_text(value, field)),
        }
    }

    /// Encodes every field of a nested struct as one JSON object.
    fn write_struct(&mut self, instance: &RecordInstance, row: &str) -> Value {
        let record_type = std::sync::Arc::clone(instance.record_type());
        let mut object = Map::new();
        for (field_index, field) in record_type.fields().iter().enumerate() {
            let Some(elements) = instance.elements(field_index) else {
                continue;
            };
            let column = field.export_name();
            let value = if field.is_static_array() {
                Value::Array(
                    elements
                        .iter()
                        .enumerate()
                        .map(|(i, element)| self.write_container_entry(element, field, row, column, i))
                        .collect(),
                )
            } else {
                match elements.first() {
                    Some(element) => self.write_struct_entry(element, field, row, column),
                    None => Value::Null,
                }
            };
            object.insert(column.to_string(), value);
        }
        Value::Object(object)
    }
}

fn nested_label(kind: &FieldKind) -> Option<&'static str> {
    match kind {
        FieldKind::Array(_) => Some("arrays"),
        FieldKind::Set(_) => Some("sets"),
        FieldKind::Map { .. } => Some("maps"),
        _ => None,
    }
}
