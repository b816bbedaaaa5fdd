//! CLI module for gridtable
//!
//! Provides command-line interface for:
//! - check-schema: Load a schema and describe its row struct
//! - import: Read a Gridly document and report problems
//! - convert: Import then export a page of rows
//! - export-text: Write localized text entries as a Gridly document

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check_schema, convert, describe_schema, export_text, import, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_input, write_json, write_value};
