//! Configuration Pipeline Tests
//!
//! Tests that a configuration file drives import and export the way the
//! CLI wires it:
//! - Table policy comes from the `table` section
//! - Import and export options come from their sections
//! - Invalid files are rejected before any conversion

use std::fs;

use gridtable::config::{Config, ConfigError};
use gridtable::convert::{ProblemLog, TableExporter, TableImporter};
use gridtable::schema::SchemaLoader;
use gridtable::table::DataTable;
use serde_json::{json, Value};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

const SCHEMA: &str = r#"{
    "structs": [{"name": "Quest", "fields": [
        {"name": "Reward", "type": "int"},
        {"name": "Steps", "type": "array", "inner": {"type": "string"}},
        {"name": "Zone", "type": "string"}
    ]}],
    "row_struct": "Quest"
}"#;

fn write_config(tmp: &TempDir, content: &Value) -> Config {
    let path = tmp.path().join("gridtable.json");
    fs::write(&path, content.to_string()).unwrap();
    Config::load(&path).unwrap()
}

fn table(config: &Config) -> DataTable {
    let mut loader = SchemaLoader::new();
    loader.load_str(SCHEMA, "quest.json").unwrap();
    DataTable::new(loader.row_struct().unwrap()).with_policy(config.table.clone())
}

// =============================================================================
// Tests
// =============================================================================

/// Key field, extra-field policy and export options all come from the file.
#[test]
fn test_config_drives_conversion() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(
        &tmp,
        &json!({
            "table": {"key_field": "QuestId", "ignore_extra_fields": true},
            "export": {"path_field": "Zone", "columns": ["Reward"], "pretty": false}
        }),
    );

    let mut table = table(&config);
    let document = json!([
        {"QuestId": "q1", "Reward": 50, "Steps": ["talk", "fetch"], "Zone": "north", "Comment": "x"}
    ]);
    let mut problems = ProblemLog::new();
    let summary = TableImporter::new(&mut table, &mut problems)
        .with_options(config.import.clone())
        .read_table(&document.to_string())
        .unwrap();
    assert_eq!(summary.rows_imported, 1);
    assert!(problems.is_empty(), "{:?}", problems);

    let text = TableExporter::new(&table, &mut problems)
        .with_options(config.export.clone())
        .export_table(0, 10)
        .unwrap();
    assert_eq!(
        text,
        r#"[{"id":"q1","cells":[{"columnId":"Reward","value":50}],"path":"north"}]"#
    );
}

/// Disabling the reparse fallback surfaces the double-encoded value.
#[test]
fn test_config_disables_reparse() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(&tmp, &json!({"import": {"reparse_string_values": false}}));

    let mut table = table(&config);
    let document = json!([{"Name": "q1", "Reward": 1, "Steps": "[\"a\"]", "Zone": "z"}]);
    let mut problems = ProblemLog::new();
    TableImporter::new(&mut table, &mut problems)
        .with_options(config.import.clone())
        .read_table(&document.to_string())
        .unwrap();
    assert!(problems.mentions("Property 'Steps' on row 'q1' is the incorrect type. Expected Array, got String."));
}

/// An invalid file never produces a config.
#[test]
fn test_invalid_config_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bad.json");
    fs::write(&path, r#"{"export": {"path_field": ""}}"#).unwrap();
    assert!(matches!(Config::load(&path), Err(ConfigError::Invalid(_))));

    fs::write(&path, "not json").unwrap();
    assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
}
