//! Gridly JSON conversion
//!
//! Import reads a top-level JSON array of flat row objects into a
//! `DataTable`; export writes a page of rows as `{id, cells, path}`
//! objects. Both directions are best effort: problems are collected in a
//! `ProblemLog` and conversion carries on wherever it can. Only structural
//! failures surface as a `ConvertError`.

mod errors;
mod exporter;
mod importer;
mod json;
mod options;
mod problems;
mod walker;

pub use errors::{ConvertError, ConvertErrorCode, ConvertResult};
pub use exporter::TableExporter;
pub use importer::{ImportSummary, TableImporter};
pub use json::{f64_to_json, json_kind_name, json_to_bool, json_to_f64, json_to_i64, row_key_text};
pub use options::{ExportOptions, ImportOptions, DEFAULT_PATH_FIELD};
pub use problems::ProblemLog;
pub use walker::StructWalker;
