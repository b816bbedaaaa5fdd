//! gridtable - Reflection-driven conversion between typed data tables and
//! Gridly JSON
//!
//! - `schema`: record type descriptors and the definition-file loader
//! - `record`: row instances, field values and their text form
//! - `table`: named rows of one record type
//! - `convert`: JSON import and export with a problem log
//! - `localization`: localized string tables as Gridly rows

pub mod cli;
pub mod config;
pub mod convert;
pub mod localization;
pub mod observability;
pub mod record;
pub mod schema;
pub mod table;
