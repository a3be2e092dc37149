//! recordkit - Declarative typed records
//!
//! Record types declare named fields with a type, a default and an optional
//! coercion rule. Instances are validated on construction and on every
//! write, in strict mode (declared fields only) or mixed mode (declared
//! fields plus free-form extras), and can be captured to and restored from
//! snapshots.

pub mod config;
pub mod observability;
pub mod record;

pub use record::{
    Coercible, FieldDef, FieldDefault, FieldType, Mode, Record, RecordError, RecordErrorCode,
    RecordResult, RecordType, Snapshot, TypeRegistry,
};
