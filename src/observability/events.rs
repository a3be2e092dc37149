//! Observability events for recordkit
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Process-wide configuration installed
    ConfigLoaded,

    // Type definition
    /// Record type declared and its schema resolved
    TypeDefined,
    /// Record type added to a registry
    TypeRegistered,

    // Instances
    /// Construction or mutation rejected
    RecordRejected,
    /// Record rebuilt from a snapshot
    SnapshotRestored,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::TypeDefined => "RECORD_TYPE_DEFINED",
            Event::TypeRegistered => "RECORD_TYPE_REGISTERED",
            Event::RecordRejected => "RECORD_REJECTED",
            Event::SnapshotRestored => "SNAPSHOT_RESTORED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::TypeDefined | Event::SnapshotRestored => Severity::Trace,
            Event::ConfigLoaded | Event::TypeRegistered => Severity::Info,
            Event::RecordRejected => Severity::Warn,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(Event::TypeDefined.as_str(), "RECORD_TYPE_DEFINED");
        assert_eq!(Event::RecordRejected.to_string(), "RECORD_REJECTED");
    }

    #[test]
    fn test_event_severity() {
        assert_eq!(Event::TypeDefined.severity(), Severity::Trace);
        assert_eq!(Event::TypeRegistered.severity(), Severity::Info);
        assert!(Event::RecordRejected.severity() > Event::SnapshotRestored.severity());
    }
}
