//! Record type declarations
//!
//! A record type is declared once through [`RecordTypeBuilder`]. Its schema
//! is resolved inside `build` and never changes afterwards, so a built type
//! can be shared across threads behind an `Arc` and read without locking.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::errors::{RecordError, RecordResult};
use super::instance::Record;
use super::resolver::{Schema, SchemaResolver};
use super::types::FieldDef;
use crate::observability::{log_event, Event};

/// Attribute policy of a record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Only schema fields may be set
    #[default]
    Strict,
    /// Schema fields are validated; any other name is stored verbatim
    Mixed,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Strict => write!(f, "strict"),
            Mode::Mixed => write!(f, "mixed"),
        }
    }
}

/// A declared record type with its resolved schema.
#[derive(Debug)]
pub struct RecordType {
    name: String,
    parent: Option<Arc<RecordType>>,
    mode: Mode,
    own_fields: Vec<FieldDef>,
    schema: Schema,
}

impl RecordType {
    /// Starts declaring a record type
    pub fn builder(name: impl Into<String>) -> RecordTypeBuilder {
        RecordTypeBuilder {
            name: name.into(),
            parent: None,
            mixed: false,
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<RecordType>> {
        self.parent.as_ref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_mixed(&self) -> bool {
        self.mode == Mode::Mixed
    }

    /// Resolved schema: own and inherited fields
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Fields declared on this type itself
    pub fn own_fields(&self) -> &[FieldDef] {
        &self.own_fields
    }

    /// Gets a resolved field by name
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.schema.get(name)
    }

    /// Resolved fields ordered by name
    pub fn fields_sorted(&self) -> Vec<&FieldDef> {
        self.schema.sorted()
    }

    /// Ancestor types, nearest first
    pub fn ancestors(&self) -> impl Iterator<Item = &RecordType> {
        std::iter::successors(self.parent.as_deref(), |t| t.parent.as_deref())
    }

    /// Whether `other` is this type or one of its ancestors
    pub fn is_subtype_of(&self, other: &RecordType) -> bool {
        std::ptr::eq(self, other) || self.ancestors().any(|t| std::ptr::eq(t, other))
    }

    /// Constructs an instance from named values
    pub fn construct<K, I>(self: &Arc<Self>, values: I) -> RecordResult<Record>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Record::new(self, values)
    }
}

/// Declaration of a record type.
pub struct RecordTypeBuilder {
    name: String,
    parent: Option<Arc<RecordType>>,
    mixed: bool,
    fields: Vec<(String, FieldDef)>,
}

impl RecordTypeBuilder {
    /// Inherits the fields (and, if mixed, the mode) of `parent`
    pub fn extends(mut self, parent: &Arc<RecordType>) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    /// Allows names outside the schema
    pub fn mixed(mut self) -> Self {
        self.mixed = true;
        self
    }

    /// Declares a field
    pub fn field(mut self, name: impl Into<String>, def: FieldDef) -> Self {
        self.fields.push((name.into(), def));
        self
    }

    /// Checks every declaration and resolves the schema.
    pub fn build(self) -> RecordResult<Arc<RecordType>> {
        if self.name.trim().is_empty() || self.name.chars().any(char::is_whitespace) {
            return Err(RecordError::declaration(
                &self.name,
                "type name must be non-empty and contain no whitespace",
            ));
        }

        let mut seen = HashSet::new();
        let mut own_fields = Vec::with_capacity(self.fields.len());
        for (name, def) in self.fields {
            if !seen.insert(name.clone()) {
                return Err(RecordError::field_declaration(
                    &self.name,
                    &name,
                    "field declared more than once",
                ));
            }
            own_fields.push(def.attach(&self.name, &name)?);
        }

        let ancestors: Vec<&[FieldDef]> = std::iter::successors(self.parent.as_deref(), |t| {
            t.parent.as_deref()
        })
        .map(|t| t.own_fields.as_slice())
        .collect();
        let schema = SchemaResolver::resolve(&own_fields, &ancestors);

        let parent_mixed = self.parent.as_ref().is_some_and(|p| p.is_mixed());
        let mode = if self.mixed || parent_mixed {
            Mode::Mixed
        } else {
            Mode::Strict
        };

        let field_count = schema.len().to_string();
        let mode_name = mode.to_string();
        log_event(
            Event::TypeDefined,
            &[
                ("fields", field_count.as_str()),
                ("mode", mode_name.as_str()),
                ("parent", self.parent.as_ref().map_or("", |p| p.name())),
                ("type", self.name.as_str()),
            ],
        );

        Ok(Arc::new(RecordType {
            name: self.name,
            parent: self.parent,
            mode,
            own_fields,
            schema,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FieldType, RecordErrorCode};
    use serde_json::json;

    fn base() -> Arc<RecordType> {
        RecordType::builder("Test")
            .field("field", FieldDef::string().nullable())
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_resolves_schema() {
        let ty = RecordType::builder("Test")
            .field("field1", FieldDef::string().with_default("42"))
            .field("field2", FieldDef::bool())
            .build()
            .unwrap();

        assert_eq!(ty.name(), "Test");
        assert_eq!(ty.mode(), Mode::Strict);
        assert_eq!(ty.schema().len(), 2);
        assert!(ty.field("field2").unwrap().is_required());
        assert_eq!(ty.field("field1").unwrap().default_value(), Some(json!("42")));
    }

    #[test]
    fn test_subtype_inherits_fields() {
        let parent = base();
        let child = RecordType::builder("DTest")
            .extends(&parent)
            .field("field2", FieldDef::int().nullable())
            .build()
            .unwrap();

        assert_eq!(child.own_fields().len(), 1);
        assert_eq!(child.schema().len(), 2);
        assert!(child.field("field").is_some());
        assert!(child.is_subtype_of(&parent));
        assert!(!parent.is_subtype_of(&child));
        assert_eq!(child.ancestors().map(RecordType::name).collect::<Vec<_>>(), vec!["Test"]);
    }

    #[test]
    fn test_parent_schema_unchanged_by_subtype() {
        let parent = base();
        let _child = RecordType::builder("DTest")
            .extends(&parent)
            .field("field", FieldDef::int())
            .build()
            .unwrap();

        assert_eq!(parent.field("field").unwrap().declared_type(), Some(&FieldType::String));
    }

    #[test]
    fn test_duplicate_own_field_rejected() {
        let err = RecordType::builder("Test")
            .field("a", FieldDef::int())
            .field("a", FieldDef::string())
            .build()
            .unwrap_err();
        assert_eq!(err.code(), RecordErrorCode::SchemaDeclaration);
        assert_eq!(err.field(), Some("a"));
    }

    #[test]
    fn test_bad_type_name_rejected() {
        assert!(RecordType::builder("").build().is_err());
        assert!(RecordType::builder("two words").build().is_err());
    }

    #[test]
    fn test_fields_sorted_by_name() {
        let parent = RecordType::builder("Test")
            .field("zeta", FieldDef::int())
            .build()
            .unwrap();
        let child = RecordType::builder("DTest")
            .extends(&parent)
            .field("alpha", FieldDef::int())
            .build()
            .unwrap();

        let names: Vec<_> = child.fields_sorted().into_iter().map(FieldDef::name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(child.schema().names().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_construct_builds_instance() {
        let ty = base();
        let record = ty.construct([("field", json!("x"))]).unwrap();
        assert_eq!(record.get("field"), Some(&json!("x")));
        assert!(Arc::ptr_eq(record.record_type(), &ty));

        let err = ty.construct([("other", json!(1))]).unwrap_err();
        assert_eq!(err.code(), RecordErrorCode::UnknownField);
    }

    #[test]
    fn test_mixed_mode_is_inherited() {
        let open = RecordType::builder("Open").mixed().build().unwrap();
        let child = RecordType::builder("Child").extends(&open).build().unwrap();
        assert!(child.is_mixed());

        let strict = base();
        let opened = RecordType::builder("Opened").extends(&strict).mixed().build().unwrap();
        assert!(opened.is_mixed());
        assert!(!strict.is_mixed());
    }
}
