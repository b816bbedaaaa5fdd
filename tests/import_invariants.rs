//! Import Invariant Tests
//!
//! Tests for the JSON import path:
//! - Rows are independent; one bad row never stops the batch
//! - Structural failures leave the table untouched
//! - Every problem is reported in the problem log
//! - Double-encoded string values are decoded once

use std::sync::Arc;

use gridtable::convert::{ConvertErrorCode, ImportOptions, ProblemLog, TableImporter};
use gridtable::record::FieldValue;
use gridtable::schema::{RecordType, SchemaLoader};
use gridtable::table::{DataTable, TablePolicy};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

const SCHEMA: &str = r#"{
    "enums": [
        {"name": "Rarity", "symbols": ["Common", "Rare", {"name": "Legendary", "value": 10}]}
    ],
    "structs": [
        {"name": "Stats", "fields": [
            {"name": "Power", "type": "float"},
            {"name": "Speed", "type": "int", "width": "u8"}
        ]},
        {"name": "ItemRow", "fields": [
            {"name": "Level", "type": "int", "width": "u8"},
            {"name": "Title", "type": "string", "aliases": ["Caption"]},
            {"name": "Rarity", "type": "enum", "enum": "Rarity"},
            {"name": "Tier", "type": "int", "width": "u8", "enum": "Rarity"},
            {"name": "Tags", "type": "set", "inner": {"type": "name"}},
            {"name": "Costs", "type": "map", "key": {"type": "string"}, "value": {"type": "int"}},
            {"name": "Stats", "type": "struct", "struct": "Stats"},
            {"name": "Slots", "type": "int", "arity": 3},
            {"name": "Note", "type": "string", "optional": true}
        ]}
    ],
    "row_struct": "ItemRow"
}"#;

fn row_struct() -> Arc<RecordType> {
    let mut loader = SchemaLoader::new();
    loader.load_str(SCHEMA, "items.json").unwrap();
    loader.row_struct().unwrap()
}

fn full_row(name: &str) -> serde_json::Value {
    json!({
        "Name": name,
        "Level": 12,
        "Title": "Iron Sword",
        "Rarity": "Rare",
        "Tier": "Legendary",
        "Tags": ["melee", "iron"],
        "Costs": {"gold": 3},
        "Stats": {"Power": 1.5, "Speed": 4},
        "Slots": [1, 2, 3]
    })
}

fn import(table: &mut DataTable, document: &str) -> ProblemLog {
    let mut problems = ProblemLog::new();
    let _ = TableImporter::new(table, &mut problems).read_table(document);
    problems
}

// =============================================================================
// Happy Path
// =============================================================================

/// A well-formed row imports without problems.
#[test]
fn test_full_row_imports_cleanly() {
    let mut table = DataTable::new(row_struct());
    let document = json!([full_row("sword")]).to_string();
    let problems = import(&mut table, &document);

    assert!(problems.is_empty(), "{:?}", problems);
    let row = table.row("sword").unwrap();
    assert_eq!(row.field("Level"), Some(&FieldValue::Int(12)));
    assert_eq!(row.field("Title"), Some(&FieldValue::Str("Iron Sword".into())));
    assert_eq!(row.field("Rarity"), Some(&FieldValue::Enum(1)));
    assert_eq!(row.field("Tier"), Some(&FieldValue::Int(10)));
    assert_eq!(row.field("Tags").and_then(|v| v.as_set()).map(|s| s.len()), Some(2));
    assert_eq!(
        row.field("Costs")
            .and_then(|v| v.as_map())
            .and_then(|m| m.get(&FieldValue::Str("gold".into()))),
        Some(&FieldValue::Int(3))
    );
    let stats = row.field("Stats").and_then(|v| v.as_struct()).unwrap();
    assert_eq!(stats.field("Power"), Some(&FieldValue::Float(1.5)));
    assert_eq!(row.elements(7).unwrap(), &[FieldValue::Int(1), FieldValue::Int(2), FieldValue::Int(3)]);
}

/// Rows keep document order.
#[test]
fn test_rows_keep_document_order() {
    let mut table = DataTable::new(row_struct());
    let document = json!([full_row("c"), full_row("a"), full_row("b")]).to_string();
    import(&mut table, &document);

    let names: Vec<&str> = table.row_names().map(|n| n.as_str()).collect();
    assert_eq!(names, vec!["c", "a", "b"]);
}

// =============================================================================
// Fatal Conditions
// =============================================================================

/// Whitespace-only input is empty input.
#[test]
fn test_whitespace_input_is_empty() {
    let mut table = DataTable::new(row_struct());
    let mut problems = ProblemLog::new();
    let err = TableImporter::new(&mut table, &mut problems)
        .read_table("  \n ")
        .unwrap_err();
    assert_eq!(err.code(), ConvertErrorCode::GridEmptyInput);
    assert_eq!(problems.entries(), &["Input data is empty.".to_string()]);
}

/// A parse failure does not clear previously imported rows.
#[test]
fn test_parse_failure_preserves_table() {
    let mut table = DataTable::new(row_struct());
    import(&mut table, &json!([full_row("sword")]).to_string());
    let problems = import(&mut table, "[{\"Name\": ");
    assert!(problems.mentions("Failed to parse the JSON data."));
    assert!(table.contains_row("sword"));
}

/// A successful import replaces every previous row.
#[test]
fn test_import_replaces_previous_rows() {
    let mut table = DataTable::new(row_struct());
    import(&mut table, &json!([full_row("old")]).to_string());
    import(&mut table, &json!([full_row("new")]).to_string());
    assert_eq!(table.len(), 1);
    assert!(table.contains_row("new"));
}

// =============================================================================
// Row-Level Recovery
// =============================================================================

/// Non-object elements are skipped and the rest of the batch imports.
#[test]
fn test_non_object_rows_are_skipped() {
    let mut table = DataTable::new(row_struct());
    let document = json!([full_row("a"), 42, "text", full_row("b")]).to_string();
    let problems = import(&mut table, &document);

    assert!(problems.mentions("Row '1' is not a valid JSON object."));
    assert!(problems.mentions("Row '2' is not a valid JSON object."));
    assert_eq!(table.len(), 2);
}

/// The first of two rows with one name wins unless duplicates are allowed.
#[test]
fn test_duplicate_rows() {
    let mut first = full_row("dup");
    first["Level"] = json!(1);
    let mut second = full_row("dup");
    second["Level"] = json!(2);
    let document = json!([first, second]).to_string();

    let mut table = DataTable::new(row_struct());
    let problems = import(&mut table, &document);
    assert!(problems.mentions("Duplicate row name 'dup'."));
    assert!(problems.mentions("Failed to read row '1'."));
    assert_eq!(table.row("dup").unwrap().field("Level"), Some(&FieldValue::Int(1)));

    let mut table = DataTable::new(row_struct()).with_policy(TablePolicy {
        allow_duplicate_rows: true,
        ..TablePolicy::default()
    });
    let problems = import(&mut table, &document);
    assert!(problems.is_empty(), "{:?}", problems);
    assert_eq!(table.len(), 1);
    assert_eq!(table.row("dup").unwrap().field("Level"), Some(&FieldValue::Int(2)));
}

/// Row names are canonicalised before use.
#[test]
fn test_row_names_are_canonicalised() {
    let mut table = DataTable::new(row_struct());
    let document = json!([full_row("  a.b c  ")]).to_string();
    import(&mut table, &document);
    assert!(table.contains_row("a_b_c"));
}

// =============================================================================
// Cell-Level Problems
// =============================================================================

/// Missing fields are reported unless optional or ignored by policy.
#[test]
fn test_missing_fields() {
    let mut row = full_row("r");
    row.as_object_mut().unwrap().remove("Level");
    let document = json!([row]).to_string();

    let mut table = DataTable::new(row_struct());
    let problems = import(&mut table, &document);
    assert_eq!(
        problems.entries(),
        &["Row 'r' is missing an entry for 'Level'.".to_string()]
    );

    let mut table = DataTable::new(row_struct()).with_policy(TablePolicy {
        ignore_missing_fields: true,
        ..TablePolicy::default()
    });
    assert!(import(&mut table, &document).is_empty());
}

/// A wrong type keeps the default and names the expected kind.
#[test]
fn test_incorrect_type_reported() {
    let mut row = full_row("r");
    row["Level"] = json!([1]);
    let mut table = DataTable::new(row_struct());
    let problems = import(&mut table, &json!([row]).to_string());

    assert!(problems.mentions("Property 'Level' on row 'r' is the incorrect type. Expected Integer, got Array."));
    assert_eq!(table.row("r").unwrap().field("Level"), Some(&FieldValue::Int(0)));
}

/// Values outside the field's width are rejected.
#[test]
fn test_out_of_range_integer() {
    let mut row = full_row("r");
    row["Level"] = json!(300);
    let mut table = DataTable::new(row_struct());
    let problems = import(&mut table, &json!([row]).to_string());
    assert!(problems.mentions("Problem assigning value '300' to property 'Level' on row 'r'"));
    assert!(problems.mentions("out of range for u8"));
}

/// Unknown enum symbols are reported.
#[test]
fn test_invalid_enum_symbol() {
    let mut row = full_row("r");
    row["Rarity"] = json!("Mythic");
    let mut table = DataTable::new(row_struct());
    let problems = import(&mut table, &json!([row]).to_string());
    assert!(problems.mentions("Property 'Rarity' on row 'r' has invalid enum value: Mythic."));
}

/// Static arrays report a size mismatch and import what fits.
#[test]
fn test_static_array_size_mismatch() {
    let mut row = full_row("r");
    row["Slots"] = json!([7, 8, 9, 10]);
    let mut table = DataTable::new(row_struct());
    let problems = import(&mut table, &json!([row]).to_string());

    assert!(problems.mentions(
        "Property 'Slots' on row 'r' is a static sized array with 3 elements, but we have 4 values to import"
    ));
    let imported = table.row("r").unwrap().elements(7).unwrap();
    assert_eq!(imported, &[FieldValue::Int(7), FieldValue::Int(8), FieldValue::Int(9)]);
}

/// Bad container entries are reported by index.
#[test]
fn test_bad_array_entry() {
    let mut row = full_row("r");
    row["Tags"] = json!(["ok", 5]);
    let mut table = DataTable::new(row_struct());
    let problems = import(&mut table, &json!([row]).to_string());
    assert!(problems.mentions("Entry 1 on property 'Tags' on row 'r' is the incorrect type. Expected String, got Number."));
}

// =============================================================================
// Double-Encoded Values
// =============================================================================

/// Containers and structs written as JSON text are decoded without problems.
#[test]
fn test_double_encoded_values() {
    let mut row = full_row("r");
    row["Costs"] = json!("{\"gold\": 9}");
    row["Stats"] = json!("{\"Power\": 2.0, \"Speed\": 1}");
    let mut table = DataTable::new(row_struct());
    let problems = import(&mut table, &json!([row]).to_string());

    assert!(problems.is_empty(), "{:?}", problems);
    let imported = table.row("r").unwrap();
    let stats = imported.field("Stats").and_then(|v| v.as_struct()).unwrap();
    assert_eq!(stats.field("Speed"), Some(&FieldValue::Int(1)));
}

/// With the fallback disabled the first failure is reported.
#[test]
fn test_double_encoded_values_without_reparse() {
    let mut row = full_row("r");
    row["Costs"] = json!("{\"gold\": 9}");
    let mut table = DataTable::new(row_struct());
    let mut problems = ProblemLog::new();
    TableImporter::new(&mut table, &mut problems)
        .with_options(ImportOptions {
            reparse_string_values: false,
        })
        .read_table(&json!([row]).to_string())
        .unwrap();
    assert!(problems.mentions("Property 'Costs' on row 'r' is the incorrect type. Expected Object, got String."));
}
