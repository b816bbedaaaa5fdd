//! Table import: JSON document to rows
//!
//! The document is a top-level JSON array of flat row objects. Each row is
//! read independently; one bad row never stops the batch. Only an empty
//! input, a table without a row struct, or an unparseable document fails
//! the whole call.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::observability::{log_event_with_fields, Event};
use crate::table::{DataTable, RowName};

use super::errors::{ConvertError, ConvertResult};
use super::json::row_key_text;
use super::options::ImportOptions;
use super::problems::ProblemLog;
use super::walker::StructWalker;

/// Row counts of one import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Top-level array elements seen
    pub rows_read: usize,
    /// Rows registered and read without a row-level failure
    pub rows_imported: usize,
    /// Elements skipped or rows that failed part way
    pub rows_failed: usize,
}

pub struct TableImporter<'a> {
    table: &'a mut DataTable,
    problems: &'a mut ProblemLog,
    options: ImportOptions,
}

impl<'a> TableImporter<'a> {
    pub fn new(table: &'a mut DataTable, problems: &'a mut ProblemLog) -> Self {
        Self {
            table,
            problems,
            options: ImportOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ImportOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the table's rows with the rows of `json_text`.
    ///
    /// Fatal errors are returned and also recorded in the problem log.
    pub fn read_table(&mut self, json_text: &str) -> ConvertResult<ImportSummary> {
        let table_name = self
            .table
            .row_struct()
            .map(|s| s.name().to_string())
            .unwrap_or_default();
        log_event_with_fields(
            Event::ImportBegin,
            &[("bytes", &json_text.len().to_string()), ("struct", &table_name)],
        );

        match self.read_rows(json_text) {
            Ok(summary) => {
                log_event_with_fields(
                    Event::ImportComplete,
                    &[
                        ("problems", &self.problems.len().to_string()),
                        ("rows_failed", &summary.rows_failed.to_string()),
                        ("rows_imported", &summary.rows_imported.to_string()),
                        ("rows_read", &summary.rows_read.to_string()),
                        ("struct", &table_name),
                    ],
                );
                Ok(summary)
            }
            Err(err) => {
                self.problems.push(err.message());
                log_event_with_fields(
                    Event::ImportFailed,
                    &[("code", err.code().code()), ("message", err.message())],
                );
                Err(err)
            }
        }
    }

    fn read_rows(&mut self, json_text: &str) -> ConvertResult<ImportSummary> {
        if json_text.trim().is_empty() {
            return Err(ConvertError::empty_input());
        }
        if self.table.row_struct().is_none() {
            return Err(ConvertError::no_row_struct());
        }

        let parsed: Value = serde_json::from_str(json_text).map_err(ConvertError::json_parse)?;
        let Value::Array(rows) = parsed else {
            return Err(ConvertError::json_parse("the document is not a JSON array"));
        };

        // `[]` is a valid document: it clears the table and reports no problems.
        self.table.empty_table();

        let mut summary = ImportSummary {
            rows_read: rows.len(),
            ..ImportSummary::default()
        };
        for (row_index, row) in rows.iter().enumerate() {
            let Value::Object(object) = row else {
                self.problems
                    .push(format!("Row '{}' is not a valid JSON object.", row_index));
                self.reject(row_index);
                summary.rows_failed += 1;
                continue;
            };
            if self.read_row(object, row_index) {
                summary.rows_imported += 1;
            } else {
                self.problems
                    .push(format!("Failed to read row '{}'.", row_index));
                self.reject(row_index);
                summary.rows_failed += 1;
            }
        }
        Ok(summary)
    }

    /// Reads one row object into the table.
    ///
    /// The row is registered before its fields are read, so a row that fails
    /// part way stays in the table with whatever was populated.
    pub fn read_row(&mut self, row: &Map<String, Value>, row_index: usize) -> bool {
        let Some(record_type) = self.table.row_struct().cloned() else {
            return false;
        };
        let policy = self.table.policy().clone();
        let key_field = policy.key_field();

        let name = row
            .get(key_field)
            .and_then(row_key_text)
            .and_then(|text| RowName::make_valid(&text));
        let Some(name) = name else {
            self.problems.push(format!(
                "Row '{}' missing key field '{}'.",
                row_index, key_field
            ));
            return false;
        };

        if !policy.allow_duplicate_rows && self.table.contains_row(name.as_str()) {
            self.problems
                .push(format!("Duplicate row name '{}'.", name));
            return false;
        }

        if !policy.ignore_extra_fields {
            for key in row.keys() {
                if key == key_field {
                    continue;
                }
                if record_type.find_by_import_name(key).is_none() {
                    self.problems.push(format!(
                        "Property '{}' on row '{}' cannot be found in struct '{}'.",
                        key,
                        name,
                        record_type.name()
                    ));
                }
            }
        }

        let row_name = name.to_string();
        let mut walker = StructWalker::new(&mut *self.problems)
            .ignore_missing_fields(policy.ignore_missing_fields)
            .reparse_string_values(self.options.reparse_string_values);
        match self.table.add_row(name) {
            Some(instance) => walker.read_struct(row, instance, &row_name),
            None => false,
        }
    }

    fn reject(&self, row_index: usize) {
        log_event_with_fields(Event::RowRejected, &[("row", &row_index.to_string())]);
    }
}
