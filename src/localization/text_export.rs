//! Localized text entries to a Gridly JSON document
//!
//! One row per entry: `{ "id", ["path"], "cells" }`. Cells hold the source
//! string, then context and metadata, then one cell per requested target
//! culture that has a translation.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::convert::{ConvertError, ConvertResult};
use crate::observability::{log_event_with_fields, Event};

use super::culture::to_gridly_culture;
use super::settings::{ColumnDataType, LocalizationSettings};

/// Gathered context of a text entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextContext {
    #[serde(default)]
    pub source_location: String,
    #[serde(default)]
    pub metadata: IndexMap<String, String>,
}

/// One localizable string and its translations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEntry {
    #[serde(default)]
    pub namespace: String,
    pub key: String,
    pub native_culture: String,
    #[serde(default)]
    pub native_string: String,
    /// Culture code to translated string
    #[serde(default)]
    pub translations: IndexMap<String, String>,
    #[serde(default)]
    pub context: Option<TextContext>,
}

pub struct TextExporter<'a> {
    settings: &'a LocalizationSettings,
    include_targets: bool,
    pretty: bool,
}

impl<'a> TextExporter<'a> {
    pub fn new(settings: &'a LocalizationSettings) -> Self {
        Self {
            settings,
            include_targets: false,
            pretty: true,
        }
    }

    /// Also write target-culture cells
    pub fn include_targets(mut self, include: bool) -> Self {
        self.include_targets = include;
        self
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn export_text(&self, entries: &[TextEntry]) -> ConvertResult<String> {
        let rows: Vec<Value> = entries.iter().map(|entry| self.export_entry(entry)).collect();
        let document = Value::Array(rows);
        let written = if self.pretty {
            serde_json::to_string_pretty(&document)
        } else {
            serde_json::to_string(&document)
        };
        let text = written.map_err(ConvertError::json_write)?;

        log_event_with_fields(
            Event::TextExportComplete,
            &[
                ("rows", &entries.len().to_string()),
                ("targets", if self.include_targets { "true" } else { "false" }),
            ],
        );
        Ok(text)
    }

    pub fn export_entry(&self, entry: &TextEntry) -> Value {
        let settings = self.settings;
        let mut row = Map::new();
        let mut cells = Vec::new();

        let id = if settings.use_combined_namespace_id {
            let namespace = if entry.namespace.contains("blueprints/") {
                ""
            } else {
                entry.namespace.as_str()
            };
            format!("{},{}", namespace, entry.key)
        } else {
            entry.key.clone()
        };
        row.insert("id".into(), Value::String(id));

        if settings.exports_namespace() {
            if settings.namespace_is_path() {
                row.insert("path".into(), Value::String(entry.namespace.clone()));
            } else if !settings.namespace_column_id.is_empty() {
                cells.push(cell(&settings.namespace_column_id, json!(entry.namespace)));
            }
        }

        if let Some(code) = to_gridly_culture(settings, &entry.native_culture) {
            let column = format!("{}{}", settings.source_language_column_prefix, code);
            cells.push(cell(&column, json!(entry.native_string)));
        }

        if let Some(context) = &entry.context {
            if settings.export_context {
                let location = context.source_location.replace(" - line ", ":");
                cells.push(cell(&settings.context_column_id, json!(location)));
            }
            if settings.export_metadata {
                for (key, value) in &context.metadata {
                    let Some(info) = settings.metadata_mapping.get(key) else {
                        continue;
                    };
                    let value = match info.data_type {
                        ColumnDataType::String => json!(value),
                        ColumnDataType::Number => json!(leading_integer(value)),
                    };
                    cells.push(cell(&info.name, value));
                }
            }
        }

        if self.include_targets {
            for culture in &settings.target_cultures {
                if *culture == entry.native_culture {
                    continue;
                }
                let Some(translated) = entry.translations.get(culture) else {
                    continue;
                };
                if let Some(code) = to_gridly_culture(settings, culture) {
                    let column = format!("{}{}", settings.target_language_column_prefix, code);
                    cells.push(cell(&column, json!(translated)));
                }
            }
        }

        row.insert("cells".into(), Value::Array(cells));
        Value::Object(row)
    }
}

fn cell(column: &str, value: Value) -> Value {
    json!({ "columnId": column, "value": value })
}

/// Integer prefix of `text` after leading whitespace, 0 when there is none.
/// Saturates instead of overflowing.
fn leading_integer(text: &str) -> i64 {
    let trimmed = text.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let mut value: i64 = 0;
    for digit in digits.bytes().take_while(u8::is_ascii_digit) {
        let d = i64::from(digit - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(d)
        } else {
            value.saturating_mul(10).saturating_add(d)
        };
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::localization::ColumnInfo;

    fn entry() -> TextEntry {
        let mut translations = IndexMap::new();
        translations.insert("en".to_string(), "Hello".to_string());
        translations.insert("fr-FR".to_string(), "Bonjour".to_string());
        translations.insert("de".to_string(), "Hallo".to_string());
        TextEntry {
            namespace: "UI".into(),
            key: "greeting".into(),
            native_culture: "en".into(),
            native_string: "Hello".into(),
            translations,
            context: Some(TextContext {
                source_location: "/Game/Menu.uasset - line 12".into(),
                metadata: IndexMap::from([
                    ("MaxLength".to_string(), " 42 chars".to_string()),
                    ("Speaker".to_string(), "Narrator".to_string()),
                    ("Unmapped".to_string(), "x".to_string()),
                ]),
            }),
        }
    }

    fn columns(row: &Value) -> Vec<String> {
        row["cells"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["columnId"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_default_row() {
        let settings = LocalizationSettings::default();
        let row = TextExporter::new(&settings).export_entry(&entry());
        assert_eq!(
            row,
            json!({
                "id": "UI,greeting",
                "cells": [
                    {"columnId": "src_en", "value": "Hello"},
                    {"columnId": "context", "value": "/Game/Menu.uasset:12"}
                ]
            })
        );
    }

    #[test]
    fn test_blueprint_namespace_blanked() {
        let settings = LocalizationSettings::default();
        let mut e = entry();
        e.namespace = "Game/blueprints/Hud".into();
        let row = TextExporter::new(&settings).export_entry(&e);
        assert_eq!(row["id"], ",greeting");
    }

    #[test]
    fn test_namespace_as_path_or_cell() {
        let mut settings = LocalizationSettings {
            use_combined_namespace_id: false,
            ..LocalizationSettings::default()
        };
        let row = TextExporter::new(&settings).export_entry(&entry());
        assert_eq!(row["id"], "greeting");
        assert_eq!(row["path"], "UI");
        let keys: Vec<_> = row.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["id", "path", "cells"]);

        settings.namespace_column_id = "ns".into();
        let row = TextExporter::new(&settings).export_entry(&entry());
        assert!(row.get("path").is_none());
        assert_eq!(columns(&row)[0], "ns");
    }

    #[test]
    fn test_targets_skip_native_and_missing() {
        let settings = LocalizationSettings {
            target_cultures: vec!["en".into(), "fr-FR".into(), "ja".into(), "de".into()],
            export_context: false,
            ..LocalizationSettings::default()
        };
        let row = TextExporter::new(&settings)
            .include_targets(true)
            .export_entry(&entry());
        assert_eq!(columns(&row), vec!["src_en", "tg_frFR", "tg_de"]);

        let row = TextExporter::new(&settings).export_entry(&entry());
        assert_eq!(columns(&row), vec!["src_en"]);
    }

    #[test]
    fn test_metadata_cells() {
        let mut settings = LocalizationSettings {
            export_metadata: true,
            ..LocalizationSettings::default()
        };
        settings.metadata_mapping.insert(
            "MaxLength".into(),
            ColumnInfo {
                name: "max_len".into(),
                data_type: ColumnDataType::Number,
            },
        );
        settings.metadata_mapping.insert(
            "Speaker".into(),
            ColumnInfo {
                name: "speaker".into(),
                data_type: ColumnDataType::String,
            },
        );
        let row = TextExporter::new(&settings).export_entry(&entry());
        let cells = row["cells"].as_array().unwrap();
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[2], json!({"columnId": "max_len", "value": 42}));
        assert_eq!(cells[3], json!({"columnId": "speaker", "value": "Narrator"}));
    }

    #[test]
    fn test_leading_integer() {
        assert_eq!(leading_integer("  17abc"), 17);
        assert_eq!(leading_integer("-5"), -5);
        assert_eq!(leading_integer("abc"), 0);
        assert_eq!(leading_integer(""), 0);
        assert_eq!(leading_integer("99999999999999999999999"), i64::MAX);
    }

    #[test]
    fn test_export_text_document() {
        let settings = LocalizationSettings::default();
        let text = TextExporter::new(&settings)
            .pretty(false)
            .export_text(&[entry()])
            .unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 1);
        assert!(text.starts_with(r#"[{"id":"UI,greeting","cells":"#));
    }
}
