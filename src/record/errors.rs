//! Record error types
//!
//! Error codes:
//! - REC_UNKNOWN_FIELD
//! - REC_MISSING_REQUIRED_FIELD
//! - REC_TYPE_MISMATCH
//! - REC_COERCION_FAILED
//! - REC_SCHEMA_DECLARATION
//! - REC_TYPE_ALREADY_DEFINED
//! - REC_UNKNOWN_TYPE
//! - REC_SNAPSHOT_TYPE_MISMATCH
//! - REC_MALFORMED_DECLARATION
//!
//! Every error is raised at the point of detection and carries the record
//! type name plus, where a single field is at fault, its details.

use std::fmt;

use thiserror::Error;

/// Record error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordErrorCode {
    /// Name is not part of a strict record's schema
    UnknownField,
    /// Required field has no value after construction
    MissingRequiredField,
    /// Value type differs from the declared type and coercion is off
    TypeMismatch,
    /// Coercion was attempted and the conversion failed
    CoercionFailed,
    /// Field or type declaration is malformed
    SchemaDeclaration,
    /// A type with this name is already registered
    TypeAlreadyDefined,
    /// No registered type with this name
    UnknownType,
    /// Snapshot was captured from a different record type
    SnapshotTypeMismatch,
    /// Declaration or snapshot text could not be parsed
    MalformedDeclaration,
}

impl RecordErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            RecordErrorCode::UnknownField => "REC_UNKNOWN_FIELD",
            RecordErrorCode::MissingRequiredField => "REC_MISSING_REQUIRED_FIELD",
            RecordErrorCode::TypeMismatch => "REC_TYPE_MISMATCH",
            RecordErrorCode::CoercionFailed => "REC_COERCION_FAILED",
            RecordErrorCode::SchemaDeclaration => "REC_SCHEMA_DECLARATION",
            RecordErrorCode::TypeAlreadyDefined => "REC_TYPE_ALREADY_DEFINED",
            RecordErrorCode::UnknownType => "REC_UNKNOWN_TYPE",
            RecordErrorCode::SnapshotTypeMismatch => "REC_SNAPSHOT_TYPE_MISMATCH",
            RecordErrorCode::MalformedDeclaration => "REC_MALFORMED_DECLARATION",
        }
    }

    /// Returns true for errors raised while defining types rather than
    /// while building or mutating instances
    pub fn is_declaration_error(&self) -> bool {
        matches!(
            self,
            RecordErrorCode::SchemaDeclaration
                | RecordErrorCode::TypeAlreadyDefined
                | RecordErrorCode::UnknownType
                | RecordErrorCode::MalformedDeclaration
        )
    }
}

impl fmt::Display for RecordErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Field-level failure details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDetails {
    /// Field path (e.g., "tags[2]")
    pub field: String,
    /// Expected type or condition
    pub expected: String,
    /// Actual value or type found
    pub actual: String,
}

impl ValidationDetails {
    pub fn new(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::new(field, "field to be set", "missing")
    }

    pub fn unknown_field(field: impl Into<String>) -> Self {
        Self::new(field, "a declared field", "undeclared name")
    }
}

impl fmt::Display for ValidationDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field '{}': expected {}, got {}", self.field, self.expected, self.actual)
    }
}

/// Record error with full context
#[derive(Debug, Clone, Error)]
#[error("{code}: {message}")]
pub struct RecordError {
    code: RecordErrorCode,
    message: String,
    type_name: Option<String>,
    details: Option<ValidationDetails>,
}

impl RecordError {
    /// Name passed to a constructor or `update` is not a declared field
    pub fn invalid_argument(type_name: &str, field: &str) -> Self {
        Self {
            code: RecordErrorCode::UnknownField,
            message: format!("{} is an invalid argument for record {}", field, type_name),
            type_name: Some(type_name.to_string()),
            details: Some(ValidationDetails::unknown_field(field)),
        }
    }

    /// Several names passed to a constructor or `update` are not declared
    pub fn invalid_arguments(type_name: &str, fields: &[&str]) -> Self {
        if let [field] = fields {
            return Self::invalid_argument(type_name, field);
        }
        let joined = fields.join(", ");
        Self {
            code: RecordErrorCode::UnknownField,
            message: format!("{} are invalid arguments for record {}", joined, type_name),
            type_name: Some(type_name.to_string()),
            details: fields.first().map(|f| ValidationDetails::unknown_field(*f)),
        }
    }

    /// Attribute assignment to a name outside a strict record's schema
    pub fn attribute_not_found(type_name: &str, field: &str) -> Self {
        Self {
            code: RecordErrorCode::UnknownField,
            message: format!("record {} has no attribute '{}'", type_name, field),
            type_name: Some(type_name.to_string()),
            details: Some(ValidationDetails::unknown_field(field)),
        }
    }

    pub fn missing_required(type_name: &str, field: &str) -> Self {
        Self {
            code: RecordErrorCode::MissingRequiredField,
            message: format!("{}.{} is required", type_name, field),
            type_name: Some(type_name.to_string()),
            details: Some(ValidationDetails::missing_field(field)),
        }
    }

    pub fn type_mismatch(type_name: &str, field: &str, expected: &str, actual: &str) -> Self {
        Self {
            code: RecordErrorCode::TypeMismatch,
            message: format!("{}.{}: expected {} but got {}", type_name, field, expected, actual),
            type_name: Some(type_name.to_string()),
            details: Some(ValidationDetails::new(field, expected, actual)),
        }
    }

    pub fn coercion_failed(
        type_name: &str,
        field: &str,
        value: &str,
        target: &str,
        reason: &str,
    ) -> Self {
        Self {
            code: RecordErrorCode::CoercionFailed,
            message: format!(
                "{}.{}: auto-coercion of {} to {} failed: {}",
                type_name, field, value, target, reason
            ),
            type_name: Some(type_name.to_string()),
            details: Some(ValidationDetails::new(field, target, value)),
        }
    }

    pub fn declaration(type_name: &str, reason: impl Into<String>) -> Self {
        Self {
            code: RecordErrorCode::SchemaDeclaration,
            message: format!("invalid declaration of {}: {}", type_name, reason.into()),
            type_name: Some(type_name.to_string()),
            details: None,
        }
    }

    pub fn field_declaration(type_name: &str, field: &str, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            code: RecordErrorCode::SchemaDeclaration,
            message: format!("invalid declaration of {}.{}: {}", type_name, field, reason),
            type_name: Some(type_name.to_string()),
            details: Some(ValidationDetails::new(field, "well-formed field declaration", reason)),
        }
    }

    pub fn type_already_defined(type_name: &str) -> Self {
        Self {
            code: RecordErrorCode::TypeAlreadyDefined,
            message: format!("record type {} is already defined", type_name),
            type_name: Some(type_name.to_string()),
            details: None,
        }
    }

    pub fn unknown_type(type_name: &str) -> Self {
        Self {
            code: RecordErrorCode::UnknownType,
            message: format!("record type {} is not defined", type_name),
            type_name: Some(type_name.to_string()),
            details: None,
        }
    }

    pub fn snapshot_type_mismatch(expected: &str, found: &str) -> Self {
        Self {
            code: RecordErrorCode::SnapshotTypeMismatch,
            message: format!("snapshot of {} cannot be restored as {}", found, expected),
            type_name: Some(expected.to_string()),
            details: Some(ValidationDetails::new("$type", expected, found)),
        }
    }

    pub fn malformed(what: &str, reason: impl fmt::Display) -> Self {
        Self {
            code: RecordErrorCode::MalformedDeclaration,
            message: format!("malformed {}: {}", what, reason),
            type_name: None,
            details: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> RecordErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the record type name if applicable
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    /// Returns validation details if applicable
    pub fn details(&self) -> Option<&ValidationDetails> {
        self.details.as_ref()
    }

    /// Returns the offending field name if applicable
    pub fn field(&self) -> Option<&str> {
        self.details.as_ref().map(|d| d.field.as_str())
    }
}

/// Result type for record operations
pub type RecordResult<T> = Result<T, RecordError>;
