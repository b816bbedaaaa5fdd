//! Localized Text Export Tests
//!
//! Tests for string-table export:
//! - Row ids follow the namespace settings
//! - Language columns use the Gridly culture codes
//! - Target columns are written only on request

use gridtable::config::Config;
use gridtable::localization::{TextEntry, TextExporter};
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn entries() -> Vec<TextEntry> {
    serde_json::from_value(json!([
        {
            "namespace": "Menu",
            "key": "play",
            "native_culture": "en-US",
            "native_string": "Play",
            "translations": {"en-US": "Play", "fr-FR": "Jouer", "de-DE": "Spielen"},
            "context": {"source_location": "/Game/UI/Main.uasset - line 4"}
        },
        {
            "namespace": "Game/blueprints/Hud",
            "key": "hp",
            "native_culture": "en-US",
            "native_string": "HP",
            "translations": {"fr-FR": "PV"}
        }
    ]))
    .unwrap()
}

fn export(config: &Config, targets: bool) -> Vec<Value> {
    let text = TextExporter::new(&config.localization)
        .include_targets(targets)
        .export_text(&entries())
        .unwrap();
    serde_json::from_str(&text).unwrap()
}

fn column_ids(row: &Value) -> Vec<String> {
    row["cells"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["columnId"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

/// Default settings combine namespace and key and write source and context.
#[test]
fn test_default_settings() {
    let rows = export(&Config::default(), false);
    assert_eq!(rows.len(), 2);

    assert_eq!(
        rows[0],
        json!({
            "id": "Menu,play",
            "cells": [
                {"columnId": "src_enUS", "value": "Play"},
                {"columnId": "context", "value": "/Game/UI/Main.uasset:4"}
            ]
        })
    );
    assert_eq!(rows[1]["id"], ",hp");
    assert_eq!(column_ids(&rows[1]), vec!["src_enUS"]);
}

/// Targets come from configuration, skipping the native culture.
#[test]
fn test_target_columns_from_config() {
    let config = Config::from_json(
        r#"{"localization": {
            "target_cultures": ["en-US", "fr-FR", "de-DE"],
            "culture_map": {"de-DE": "deDE_custom"},
            "target_language_column_prefix": "lang_"
        }}"#,
    )
    .unwrap();

    let rows = export(&config, true);
    assert_eq!(
        column_ids(&rows[0]),
        vec!["src_enUS", "context", "lang_frFR", "lang_deDE_custom"]
    );
    assert_eq!(column_ids(&rows[1]), vec!["src_enUS", "lang_frFR"]);

    let rows = export(&config, false);
    assert_eq!(column_ids(&rows[0]), vec!["src_enUS", "context"]);
}

/// Separate ids put the namespace in the path.
#[test]
fn test_separate_namespace() {
    let config = Config::from_json(
        r#"{"localization": {"use_combined_namespace_id": false, "export_context": false}}"#,
    )
    .unwrap();
    let rows = export(&config, false);
    assert_eq!(rows[0], json!({"id": "play", "path": "Menu", "cells": [{"columnId": "src_enUS", "value": "Play"}]}));
    assert_eq!(rows[1]["path"], "Game/blueprints/Hud");
}

/// An empty input list exports an empty document.
#[test]
fn test_empty_input() {
    let config = Config::default();
    let text = TextExporter::new(&config.localization)
        .pretty(false)
        .export_text(&[])
        .unwrap();
    assert_eq!(text, "[]");
}
