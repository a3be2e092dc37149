//! Observability for recordkit
//!
//! Structured logging of type definitions, registrations and rejected
//! records. Logging is read-only: it never changes the outcome of the
//! operation being observed.
//!
//! # Usage
//!
//! ```ignore
//! use recordkit::observability::{Logger, Event, Severity, log_event};
//!
//! Logger::log(Severity::Info, "CUSTOM_EVENT", &[("key", "value")]);
//! log_event(Event::TypeRegistered, &[("type", "Point")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

use crate::config;
use crate::record::RecordError;

/// Log a lifecycle event at its own severity
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

/// Log a rejected construction or mutation, if enabled in config
pub fn log_rejection(err: &RecordError) {
    if !config::current().log_rejections {
        return;
    }
    log_event(
        Event::RecordRejected,
        &[
            ("code", err.code().code()),
            ("field", err.field().unwrap_or("")),
            ("message", err.message()),
            ("type", err.type_name().unwrap_or("")),
        ],
    );
}
