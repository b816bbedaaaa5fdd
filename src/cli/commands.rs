//! CLI command implementations
//!
//! Documents and reports go to stdout; logs go to stderr.

use std::path::Path;

use serde_json::{json, Value};

use crate::config::Config;
use crate::convert::{ProblemLog, TableExporter, TableImporter};
use crate::localization::{TextEntry, TextExporter};
use crate::observability::{Logger, Severity};
use crate::schema::{FieldDescriptor, FieldKind, RecordType, SchemaLoader};
use crate::table::DataTable;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{read_input, write_json, write_value};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    if cli.verbose {
        Logger::set_min_severity(Severity::Trace);
    } else if cli.quiet {
        Logger::set_min_severity(Severity::Error);
    }
    run_command(cli.command)
}

pub fn run_command(command: Command) -> CliResult<()> {
    match command {
        Command::CheckSchema { schema } => check_schema(&schema),
        Command::Import {
            schema,
            input,
            config,
        } => import(&schema, &input, config.as_deref()),
        Command::Convert {
            schema,
            input,
            config,
            start,
            max,
        } => convert(&schema, &input, config.as_deref(), start, max.unwrap_or(usize::MAX)),
        Command::ExportText {
            input,
            config,
            targets,
        } => export_text(&input, config.as_deref(), targets),
    }
}

/// Load a schema and print its row struct's columns
pub fn check_schema(schema: &Path) -> CliResult<()> {
    let loader = load_schema(schema)?;
    write_value(&describe_schema(&loader)?)
}

/// Import a document and print `{status, rows, problems}`
pub fn import(schema: &Path, input: &Path, config: Option<&Path>) -> CliResult<()> {
    let config = load_config(config)?;
    let mut table = load_table(schema, &config)?;
    let content = read_input(input)?;

    let mut problems = ProblemLog::new();
    let result = TableImporter::new(&mut table, &mut problems)
        .with_options(config.import.clone())
        .read_table(&content);

    match result {
        Ok(summary) => write_value(&json!({
            "status": "ok",
            "rows": summary,
            "problems": problems.entries(),
        })),
        Err(err) => {
            write_value(&json!({
                "status": "error",
                "code": err.code().code(),
                "problems": problems.entries(),
            }))?;
            Err(err.into())
        }
    }
}

/// Import a document, then export rows `[start, start + max)` to stdout
pub fn convert(
    schema: &Path,
    input: &Path,
    config: Option<&Path>,
    start: usize,
    max: usize,
) -> CliResult<()> {
    let config = load_config(config)?;
    let mut table = load_table(schema, &config)?;
    let content = read_input(input)?;

    let mut problems = ProblemLog::new();
    TableImporter::new(&mut table, &mut problems)
        .with_options(config.import.clone())
        .read_table(&content)?;

    let document = TableExporter::new(&table, &mut problems)
        .with_options(config.export.clone())
        .export_table(start, max)?;
    write_json(&document)
}

/// Write localized text entries as a Gridly document
pub fn export_text(input: &Path, config: Option<&Path>, targets: bool) -> CliResult<()> {
    let config = load_config(config)?;
    let content = read_input(input)?;
    let entries: Vec<TextEntry> = serde_json::from_str(&content)
        .map_err(|e| CliError::invalid_input(format!("Expected a JSON array of text entries: {}", e)))?;

    let document = TextExporter::new(&config.localization)
        .include_targets(targets)
        .pretty(config.export.pretty)
        .export_text(&entries)?;
    write_json(&document)
}

fn load_config(path: Option<&Path>) -> CliResult<Config> {
    match path {
        Some(path) => Ok(Config::load(path)?),
        None => Ok(Config::default()),
    }
}

fn load_schema(path: &Path) -> CliResult<SchemaLoader> {
    let mut loader = SchemaLoader::new();
    loader.load_file(path)?;
    Ok(loader)
}

fn load_table(schema: &Path, config: &Config) -> CliResult<DataTable> {
    let row_struct = load_schema(schema)?.row_struct()?;
    Ok(DataTable::new(row_struct).with_policy(config.table.clone()))
}

/// JSON description of the row struct
pub fn describe_schema(loader: &SchemaLoader) -> CliResult<Value> {
    let row_struct = loader.row_struct()?;
    Ok(json!({
        "row_struct": row_struct.name(),
        "structs": loader.struct_count(),
        "enums": loader.enum_count(),
        "columns": describe_fields(&row_struct),
    }))
}

fn describe_fields(record: &RecordType) -> Vec<Value> {
    record.fields().iter().map(describe_field).collect()
}

fn describe_field(field: &FieldDescriptor) -> Value {
    let mut out = json!({
        "name": field.export_name(),
        "kind": field.kind().kind_name(),
        "arity": field.arity(),
    });
    if !field.aliases().is_empty() {
        out["aliases"] = json!(field.aliases());
    }
    if field.is_optional_for_import() {
        out["optional"] = json!(true);
    }
    match field.kind() {
        FieldKind::Int { width, enum_type } => {
            out["width"] = json!(width.name());
            if let Some(e) = enum_type {
                out["enum"] = json!(e.name());
            }
        }
        FieldKind::Float(width) => out["width"] = json!(width.name()),
        FieldKind::Enum(e) => out["enum"] = json!(e.name()),
        FieldKind::Array(inner) | FieldKind::Set(inner) => out["inner"] = describe_field(inner),
        FieldKind::Map { key, value } => {
            out["key"] = describe_field(key);
            out["value"] = describe_field(value);
        }
        FieldKind::Struct(record) => out["struct"] = json!(record.name()),
        FieldKind::Bool | FieldKind::String | FieldKind::Name => {}
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_schema() {
        let mut loader = SchemaLoader::new();
        loader
            .load_str(
                r#"{
                    "enums": [{"name": "Rarity", "symbols": ["Common", "Rare"]}],
                    "structs": [{"name": "Item", "fields": [
                        {"name": "Level", "type": "int", "width": "u8"},
                        {"name": "Rarity", "type": "enum", "enum": "Rarity"},
                        {"name": "Tags", "type": "array", "inner": {"type": "name"}}
                    ]}],
                    "row_struct": "Item"
                }"#,
                "inline",
            )
            .unwrap();
        let description = describe_schema(&loader).unwrap();
        assert_eq!(description["row_struct"], "Item");
        let columns = description["columns"].as_array().unwrap();
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0]["width"], "u8");
        assert_eq!(columns[1]["enum"], "Rarity");
        assert_eq!(columns[2]["inner"]["kind"], "name");
    }

    #[test]
    fn test_describe_schema_without_row_struct() {
        let loader = SchemaLoader::new();
        let err = describe_schema(&loader).unwrap_err();
        assert_eq!(err.code_str(), "GRID_CLI_SCHEMA_ERROR");
    }
}
