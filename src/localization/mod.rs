//! Localized text export
//!
//! Writes string tables (a key, a native string and its translations per
//! entry) as Gridly rows with one column per language.

mod culture;
mod settings;
mod text_export;

pub use culture::to_gridly_culture;
pub use settings::{ColumnDataType, ColumnInfo, LocalizationSettings};
pub use text_export::{TextContext, TextEntry, TextExporter};
