//! Typed records
//!
//! Record types declare their fields with a type, a default policy and an
//! optional coercion flag. Declarations are checked and the schema (own plus
//! inherited fields) is resolved once, when the type is built.
//!
//! # Design Principles
//!
//! - Strict records hold only schema fields
//! - Mixed records also hold arbitrary extra attributes, unchecked
//! - Values are validated (and coerced, where declared) on every write
//! - Batch writes are all-or-nothing
//! - Types are immutable once built and shared via `Arc`

mod decl;
mod errors;
mod instance;
mod record_type;
mod registry;
mod resolver;
mod snapshot;
mod types;

pub use decl::{FieldDecl, RecordTypeDecl};
pub use errors::{RecordError, RecordErrorCode, RecordResult, ValidationDetails};
pub use instance::Record;
pub use record_type::{Mode, RecordType, RecordTypeBuilder};
pub use registry::TypeRegistry;
pub use resolver::{Schema, SchemaResolver};
pub use snapshot::Snapshot;
pub use types::{value_type_name, Coercible, FieldDef, FieldDefault, FieldType};
