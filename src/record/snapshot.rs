//! Record snapshots
//!
//! A snapshot captures the type name and every set value of a record.
//! Restoring goes through normal construction, so a snapshot that was
//! edited or produced elsewhere is validated like any other input.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::errors::{RecordError, RecordResult};
use super::instance::Record;
use super::record_type::RecordType;
use crate::observability::{log_event, Event};

/// Captured name/value state of a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Name of the captured record's type
    pub type_name: String,
    /// Every set field, plus extras for mixed records
    pub values: BTreeMap<String, Value>,
}

impl Snapshot {
    /// Captures the set fields of `record`
    pub fn capture(record: &Record) -> Self {
        Self {
            type_name: record.record_type().name().to_string(),
            values: record
                .items()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
        }
    }

    /// Rebuilds a record of type `ty`.
    ///
    /// Snapshots identify their type by name only, so any type carrying
    /// that name is accepted; the values are still validated against it.
    /// Fields absent from the snapshot stay unset even when they declare a
    /// default, so a captured record restores to an equal record.
    pub fn restore(&self, ty: &Arc<RecordType>) -> RecordResult<Record> {
        if ty.name() != self.type_name {
            return Err(RecordError::snapshot_type_mismatch(ty.name(), &self.type_name));
        }

        let mut record = Record::new(ty, self.values.clone())?;
        for field in ty.schema().iter() {
            if !field.is_required() && !self.values.contains_key(field.name()) {
                record.unset(field.name())?;
            }
        }

        let count = self.values.len().to_string();
        log_event(Event::SnapshotRestored, &[("type", ty.name()), ("values", count.as_str())]);
        Ok(record)
    }

    pub fn to_json(&self) -> RecordResult<String> {
        serde_json::to_string(self).map_err(|e| RecordError::malformed("snapshot", e))
    }

    pub fn from_json(content: &str) -> RecordResult<Self> {
        serde_json::from_str(content).map_err(|e| RecordError::malformed("snapshot", e))
    }
}

impl Record {
    /// Captures this record's state
    pub fn capture(&self) -> Snapshot {
        Snapshot::capture(self)
    }

    /// Rebuilds a record of type `ty` from a snapshot
    pub fn restore(ty: &Arc<RecordType>, snapshot: &Snapshot) -> RecordResult<Record> {
        snapshot.restore(ty)
    }
}
