//! Observability subsystem for gridtable
//!
//! - Structured logging (JSON lines on stderr)
//! - Typed lifecycle events
//!
//! Observability is read-only: nothing logged here feeds back into a
//! conversion result.
//!
//! # Usage
//!
//! ```ignore
//! use gridtable::observability::{log_event_with_fields, Event, Logger};
//!
//! Logger::info("SCHEMA_LOADED", &[("structs", "4")]);
//! log_event_with_fields(Event::ImportComplete, &[("rows", "42")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a lifecycle event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
