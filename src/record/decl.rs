//! Record type declarations as data
//!
//! ```json
//! {
//!   "name": "Point3",
//!   "extends": "Point",
//!   "mixed": false,
//!   "fields": [
//!     { "name": "z", "type": { "type": "int" }, "coerce": true, "default": 0 }
//!   ]
//! }
//! ```
//!
//! At most one of `default`, `optional`, `nullable` and `zero_default` may
//! be given for a field; none of them makes the field required.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use super::errors::{RecordError, RecordResult};
use super::record_type::RecordType;
use super::types::{FieldDef, FieldDefault, FieldType};

/// Declaration of a single field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    /// Declared type; absent accepts any value
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub declared_type: Option<FieldType>,
    /// Literal default (non-null)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub zero_default: bool,
    #[serde(default)]
    pub coerce: bool,
}

impl FieldDecl {
    fn default_policy(&self, type_name: &str) -> RecordResult<FieldDefault> {
        let policy = match (&self.default, self.optional, self.nullable, self.zero_default) {
            (None, false, false, false) => FieldDefault::Required,
            (Some(v), false, false, false) => FieldDefault::Value(v.clone()),
            (None, true, false, false) => FieldDefault::Unset,
            (None, false, true, false) => FieldDefault::Value(Value::Null),
            (None, false, false, true) => FieldDefault::Zero,
            _ => {
                return Err(RecordError::field_declaration(
                    type_name,
                    &self.name,
                    "conflicting default settings",
                ));
            }
        };
        Ok(policy)
    }

    fn to_field_def(&self, type_name: &str) -> RecordResult<FieldDef> {
        let mut def = FieldDef::new(self.declared_type.clone())
            .with_default_policy(self.default_policy(type_name)?);
        if self.coerce {
            def = def.coerce();
        }
        Ok(def)
    }
}

/// Declaration of a record type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordTypeDecl {
    pub name: String,
    /// Name of the parent type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default)]
    pub mixed: bool,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
}

impl RecordTypeDecl {
    /// Parses a JSON declaration
    pub fn from_json(content: &str) -> RecordResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| RecordError::malformed("record type declaration", e))
    }

    /// Builds the type. `parent` must be the type named by `extends`.
    pub fn build(&self, parent: Option<&Arc<RecordType>>) -> RecordResult<Arc<RecordType>> {
        match (&self.extends, parent) {
            (Some(wanted), Some(p)) if wanted != p.name() => {
                return Err(RecordError::declaration(
                    &self.name,
                    format!("extends {} but parent {} was supplied", wanted, p.name()),
                ));
            }
            (Some(wanted), None) => return Err(RecordError::unknown_type(wanted)),
            (None, Some(p)) => {
                return Err(RecordError::declaration(
                    &self.name,
                    format!("parent {} supplied for a root declaration", p.name()),
                ));
            }
            _ => {}
        }

        let mut builder = RecordType::builder(self.name.clone());
        if let Some(p) = parent {
            builder = builder.extends(p);
        }
        if self.mixed {
            builder = builder.mixed();
        }
        for field in &self.fields {
            builder = builder.field(field.name.clone(), field.to_field_def(&self.name)?);
        }
        builder.build()
    }
}
