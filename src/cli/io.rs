//! Input and output for CLI commands
//!
//! - Input: a file path, or `-` for stdin
//! - Output: one JSON document on stdout
//! - UTF-8 only

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read the whole input as text
pub fn read_input(path: &Path) -> CliResult<String> {
    if path.as_os_str() == "-" {
        let mut content = String::new();
        io::stdin().lock().read_to_string(&mut content)?;
        return Ok(content);
    }
    fs::read_to_string(path)
        .map_err(|e| CliError::io_error(format!("Failed to read {}: {}", path.display(), e)))
}

/// Write a JSON value to stdout
pub fn write_value(value: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

/// Write an already-serialized document to stdout
pub fn write_json(json_str: &str) -> CliResult<()> {
    let mut stdout = io::stdout();
    writeln!(stdout, "{}", json_str)?;
    stdout.flush()?;

    Ok(())
}
