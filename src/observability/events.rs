//! Observability events for gridtable
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable lifecycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Setup
    /// Schema definitions resolved
    SchemaLoaded,
    /// Configuration loaded
    ConfigLoaded,

    // Import
    /// Table import started
    ImportBegin,
    /// Table import finished (possibly with problems)
    ImportComplete,
    /// Table import aborted on a structural error
    ImportFailed,
    /// One row was skipped or only partially read
    RowRejected,

    // Export
    /// Table export started
    ExportBegin,
    /// Table export finished
    ExportComplete,
    /// Table export aborted
    ExportFailed,

    // Localization
    /// Localized text document written
    TextExportComplete,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::SchemaLoaded => "SCHEMA_LOADED",
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::ImportBegin => "IMPORT_BEGIN",
            Event::ImportComplete => "IMPORT_COMPLETE",
            Event::ImportFailed => "IMPORT_FAILED",
            Event::RowRejected => "ROW_REJECTED",

            Event::ExportBegin => "EXPORT_BEGIN",
            Event::ExportComplete => "EXPORT_COMPLETE",
            Event::ExportFailed => "EXPORT_FAILED",

            Event::TextExportComplete => "TEXT_EXPORT_COMPLETE",
        }
    }

    /// Severity an event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::ImportFailed | Event::ExportFailed => Severity::Error,
            Event::RowRejected => Severity::Warn,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
