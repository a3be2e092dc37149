//! Field type and field descriptor definitions
//!
//! Supported declared types:
//! - string: UTF-8 string
//! - int: 64-bit signed integer
//! - bool: Boolean
//! - float: 64-bit floating point
//! - array: Homogeneous array with element type
//! - object: Free-form JSON object
//!
//! A field without a declared type accepts any value. Null is accepted for
//! every field and means "explicitly empty".

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::errors::{RecordError, RecordResult};

/// Declared field types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldType {
    /// UTF-8 string
    String,
    /// 64-bit signed integer
    Int,
    /// Boolean
    Bool,
    /// 64-bit floating point
    Float,
    /// Homogeneous array with single element type
    Array {
        /// Element type (boxed to allow recursive types)
        element_type: Box<FieldType>,
    },
    /// JSON object with arbitrary keys
    Object,
}

impl FieldType {
    /// Array of the given element type
    pub fn array_of(element_type: FieldType) -> Self {
        FieldType::Array {
            element_type: Box::new(element_type),
        }
    }

    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Int => "int",
            FieldType::Bool => "bool",
            FieldType::Float => "float",
            FieldType::Array { .. } => "array",
            FieldType::Object => "object",
        }
    }

    /// Shallow type test; array elements are not inspected.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Int => value.is_i64() || value.is_u64(),
            FieldType::Bool => value.is_boolean(),
            FieldType::Float => value.is_f64(),
            FieldType::Array { .. } => value.is_array(),
            FieldType::Object => value.is_object(),
        }
    }

    /// Whether values of other types can be converted into this type
    pub fn is_coercible(&self) -> bool {
        !matches!(self, FieldType::Array { .. } | FieldType::Object)
    }

    /// Converts `value` into this type via the type's conversion constructor.
    pub fn coerce(&self, value: &Value) -> Result<Value, String> {
        match self {
            FieldType::String => String::coerce_from(value).map(Coercible::into_value),
            FieldType::Int => i64::coerce_from(value).map(Coercible::into_value),
            FieldType::Bool => bool::coerce_from(value).map(Coercible::into_value),
            FieldType::Float => f64::coerce_from(value).map(Coercible::into_value),
            FieldType::Array { .. } | FieldType::Object => {
                Err(format!("{} does not support coercion", self))
            }
        }
    }

    /// Fresh zero value of this type
    pub fn zero_value(&self) -> Value {
        match self {
            FieldType::String => Value::String(String::new()),
            FieldType::Int => Value::from(0i64),
            FieldType::Bool => Value::Bool(false),
            FieldType::Float => Value::from(0.0f64),
            FieldType::Array { .. } => Value::Array(Vec::new()),
            FieldType::Object => Value::Object(serde_json::Map::new()),
        }
    }

    /// Deep type check. Returns the path, expected and actual type of the
    /// first offending value.
    fn check(&self, value: &Value, path: &str) -> Result<(), TypeMismatch> {
        if !self.matches(value) {
            return Err(TypeMismatch {
                path: path.to_string(),
                expected: self.to_string(),
                actual: value_type_name(value),
            });
        }

        if let (FieldType::Array { element_type }, Value::Array(items)) = (self, value) {
            for (i, item) in items.iter().enumerate() {
                element_type.check(item, &format!("{}[{}]", path, i))?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Array { element_type } => write!(f, "array<{}>", element_type),
            other => write!(f, "{}", other.type_name()),
        }
    }
}

struct TypeMismatch {
    path: String,
    expected: String,
    actual: &'static str,
}

/// Returns the JSON type name for error messages.
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "float"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Conversion contract for the Rust types backing scalar field types.
///
/// `coerce_from` is the single-argument conversion constructor applied when
/// a field is declared with `coerce`.
pub trait Coercible: Sized {
    /// Declared field type this Rust type stands for
    fn field_type() -> FieldType;

    /// Exact extraction, no conversion
    fn from_value(value: &Value) -> Option<Self>;

    /// Conversion from a value of any type
    fn coerce_from(value: &Value) -> Result<Self, String>;

    fn into_value(self) -> Value;
}

impl Coercible for i64 {
    fn field_type() -> FieldType {
        FieldType::Int
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64()
    }

    fn coerce_from(value: &Value) -> Result<Self, String> {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return Ok(i);
                }
                if n.is_u64() {
                    return Err(format!("{} is out of range for int", n));
                }
                match n.as_f64() {
                    // i64::MAX as f64 rounds up to 2^63, hence the strict bound
                    Some(f)
                        if f.is_finite()
                            && f.trunc() >= i64::MIN as f64
                            && f.trunc() < i64::MAX as f64 =>
                    {
                        Ok(f.trunc() as i64)
                    }
                    _ => Err(format!("{} is out of range for int", n)),
                }
            }
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("invalid literal for int: {:?}", s)),
            Value::Bool(b) => Ok(i64::from(*b)),
            other => Err(format!("cannot convert {} to int", value_type_name(other))),
        }
    }

    fn into_value(self) -> Value {
        Value::from(self)
    }
}

impl Coercible for f64 {
    fn field_type() -> FieldType {
        FieldType::Float
    }

    fn from_value(value: &Value) -> Option<Self> {
        if value.is_f64() {
            value.as_f64()
        } else {
            None
        }
    }

    fn coerce_from(value: &Value) -> Result<Self, String> {
        let f = match value {
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| format!("{} is not representable as float", n))?,
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("invalid literal for float: {:?}", s))?,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            other => return Err(format!("cannot convert {} to float", value_type_name(other))),
        };

        if f.is_finite() {
            Ok(f)
        } else {
            Err(format!("{} is not a finite float", f))
        }
    }

    fn into_value(self) -> Value {
        Value::from(self)
    }
}

impl Coercible for bool {
    fn field_type() -> FieldType {
        FieldType::Bool
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }

    fn coerce_from(value: &Value) -> Result<Self, String> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::Number(n) => Ok(n.as_f64().is_some_and(|f| f != 0.0)),
            Value::String(s) => {
                let s = s.trim();
                if s.eq_ignore_ascii_case("true") {
                    Ok(true)
                } else if s.eq_ignore_ascii_case("false") {
                    Ok(false)
                } else {
                    Err(format!("invalid literal for bool: {:?}", s))
                }
            }
            other => Err(format!("cannot convert {} to bool", value_type_name(other))),
        }
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl Coercible for String {
    fn field_type() -> FieldType {
        FieldType::String
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }

    fn coerce_from(value: &Value) -> Result<Self, String> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Null => Err("cannot convert null to string".into()),
            other => Ok(other.to_string()),
        }
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }
}

/// Default policy of a field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldDefault {
    /// No default; the field must be supplied
    Required,
    /// Optional; left unset when not supplied
    Unset,
    /// Literal default value
    Value(Value),
    /// Fresh zero value of the declared type
    Zero,
}

/// Field descriptor.
///
/// The name is assigned when the field is attached to a record type; a
/// descriptor is never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    name: String,
    declared_type: Option<FieldType>,
    default: FieldDefault,
    coerce: bool,
}

impl FieldDef {
    /// Create a required field of the given type (`None` accepts any value)
    pub fn new(declared_type: Option<FieldType>) -> Self {
        Self {
            name: String::new(),
            declared_type,
            default: FieldDefault::Required,
            coerce: false,
        }
    }

    /// Create a required field of the given type
    pub fn typed(declared_type: FieldType) -> Self {
        Self::new(Some(declared_type))
    }

    /// Create a required field accepting any value
    pub fn any() -> Self {
        Self::new(None)
    }

    pub fn string() -> Self {
        Self::typed(FieldType::String)
    }

    pub fn int() -> Self {
        Self::typed(FieldType::Int)
    }

    pub fn bool() -> Self {
        Self::typed(FieldType::Bool)
    }

    pub fn float() -> Self {
        Self::typed(FieldType::Float)
    }

    pub fn array(element_type: FieldType) -> Self {
        Self::typed(FieldType::array_of(element_type))
    }

    pub fn object() -> Self {
        Self::typed(FieldType::Object)
    }

    /// Sets a literal default
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = FieldDefault::Value(value.into());
        self
    }

    /// Marks the field optional: left unset when not supplied
    pub fn optional(mut self) -> Self {
        self.default = FieldDefault::Unset;
        self
    }

    /// Defaults to null
    pub fn nullable(self) -> Self {
        self.with_default(Value::Null)
    }

    /// Defaults to a fresh zero value of the declared type
    pub fn zero_default(mut self) -> Self {
        self.default = FieldDefault::Zero;
        self
    }

    /// Enables auto-coercion through the declared type
    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    /// Replaces the default policy
    pub fn with_default_policy(mut self, default: FieldDefault) -> Self {
        self.default = default;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> Option<&FieldType> {
        self.declared_type.as_ref()
    }

    pub fn default_policy(&self) -> &FieldDefault {
        &self.default
    }

    pub fn coerces(&self) -> bool {
        self.coerce
    }

    /// A field is required iff it has neither a default nor an optional marker
    pub fn is_required(&self) -> bool {
        self.default == FieldDefault::Required
    }

    /// Value used when the field is not supplied, if any
    pub fn default_value(&self) -> Option<Value> {
        match &self.default {
            FieldDefault::Value(v) => Some(v.clone()),
            FieldDefault::Zero => self.declared_type.as_ref().map(FieldType::zero_value),
            FieldDefault::Required | FieldDefault::Unset => None,
        }
    }

    /// Attaches the descriptor to `type_name` under `name`, checking its
    /// structure. Literal defaults are validated (and coerced) here so that
    /// construction never trips over a bad default.
    pub(crate) fn attach(mut self, type_name: &str, name: &str) -> RecordResult<FieldDef> {
        if !is_identifier(name) {
            return Err(RecordError::field_declaration(
                type_name,
                name,
                "field name must be an identifier",
            ));
        }
        self.name = name.to_string();

        match &self.declared_type {
            None if self.coerce => {
                return Err(RecordError::field_declaration(
                    type_name,
                    name,
                    "coerce requires a declared type",
                ));
            }
            None if self.default == FieldDefault::Zero => {
                return Err(RecordError::field_declaration(
                    type_name,
                    name,
                    "zero default requires a declared type",
                ));
            }
            Some(ty) if self.coerce && !ty.is_coercible() => {
                return Err(RecordError::field_declaration(
                    type_name,
                    name,
                    format!("{} does not support coercion", ty),
                ));
            }
            _ => {}
        }

        if let FieldDefault::Value(default) = &self.default {
            let admitted = self.admit(type_name, default.clone()).map_err(|e| {
                let reason = format!("bad default: {}", e.message());
                RecordError::field_declaration(type_name, name, reason)
            })?;
            self.default = FieldDefault::Value(admitted);
        }

        Ok(self)
    }

    /// Validates `value` against the declared type, coercing it when the
    /// field allows it.
    pub fn admit(&self, type_name: &str, value: Value) -> RecordResult<Value> {
        let Some(ty) = &self.declared_type else {
            return Ok(value);
        };
        if value.is_null() {
            return Ok(value);
        }

        match ty.check(&value, &self.name) {
            Ok(()) => Ok(value),
            Err(_) if self.coerce && !ty.matches(&value) => ty.coerce(&value).map_err(|reason| {
                RecordError::coercion_failed(
                    type_name,
                    &self.name,
                    &value.to_string(),
                    ty.type_name(),
                    &reason,
                )
            }),
            Err(mismatch) => Err(RecordError::type_mismatch(
                type_name,
                &mismatch.path,
                &mismatch.expected,
                mismatch.actual,
            )),
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordErrorCode;
    use serde_json::json;

    fn attached(def: FieldDef) -> FieldDef {
        def.attach("Test", "field").unwrap()
    }

    #[test]
    fn test_field_type_names() {
        assert_eq!(FieldType::String.type_name(), "string");
        assert_eq!(FieldType::Int.type_name(), "int");
        assert_eq!(FieldType::Bool.type_name(), "bool");
        assert_eq!(FieldType::Float.type_name(), "float");
        assert_eq!(FieldType::Object.type_name(), "object");
        assert_eq!(FieldType::array_of(FieldType::Int).to_string(), "array<int>");
    }

    #[test]
    fn test_field_type_serde_tagging() {
        let ty: FieldType = serde_json::from_value(json!({
            "type": "array",
            "element_type": { "type": "int" }
        }))
        .unwrap();
        assert_eq!(ty, FieldType::array_of(FieldType::Int));
        assert_eq!(serde_json::to_value(FieldType::Bool).unwrap(), json!({ "type": "bool" }));
    }

    #[test]
    fn test_int_does_not_match_bool_or_float() {
        assert!(FieldType::Int.matches(&json!(1)));
        assert!(!FieldType::Int.matches(&json!(true)));
        assert!(!FieldType::Int.matches(&json!(1.5)));
        assert!(!FieldType::Float.matches(&json!(1)));
    }

    #[test]
    fn test_int_coercion() {
        assert_eq!(i64::coerce_from(&json!("42")), Ok(42));
        assert_eq!(i64::coerce_from(&json!(" -7 ")), Ok(-7));
        assert_eq!(i64::coerce_from(&json!(3.9)), Ok(3));
        assert_eq!(i64::coerce_from(&json!(true)), Ok(1));
        assert!(i64::coerce_from(&json!("42.2")).is_err());
        assert!(i64::coerce_from(&json!([1])).is_err());
        assert!(i64::coerce_from(&json!(u64::MAX)).is_err());
    }

    #[test]
    fn test_float_coercion() {
        assert_eq!(f64::coerce_from(&json!("42.2")), Ok(42.2));
        assert_eq!(f64::coerce_from(&json!(3)), Ok(3.0));
        assert!(f64::coerce_from(&json!("inf")).is_err());
        assert!(f64::coerce_from(&json!("abc")).is_err());
    }

    #[test]
    fn test_bool_and_string_coercion() {
        assert_eq!(bool::coerce_from(&json!("TRUE")), Ok(true));
        assert_eq!(bool::coerce_from(&json!(0)), Ok(false));
        assert!(bool::coerce_from(&json!("yes")).is_err());

        assert_eq!(String::coerce_from(&json!(42)), Ok("42".to_string()));
        assert_eq!(String::coerce_from(&json!(false)), Ok("false".to_string()));
        assert_eq!(String::coerce_from(&json!([1, 2])), Ok("[1,2]".to_string()));
    }

    #[test]
    fn test_required_derivation() {
        assert!(FieldDef::int().is_required());
        assert!(FieldDef::any().is_required());
        assert!(!FieldDef::int().optional().is_required());
        assert!(!FieldDef::int().nullable().is_required());
        assert!(!FieldDef::int().with_default(3).is_required());
        assert!(!FieldDef::int().zero_default().is_required());
    }

    #[test]
    fn test_coerce_without_type_rejected() {
        let err = FieldDef::any().coerce().attach("Test", "field").unwrap_err();
        assert_eq!(err.code(), RecordErrorCode::SchemaDeclaration);
        assert!(err.message().contains("coerce requires a declared type"));
    }

    #[test]
    fn test_coerce_on_array_rejected() {
        let err = FieldDef::array(FieldType::Int).coerce().attach("Test", "tags").unwrap_err();
        assert_eq!(err.code(), RecordErrorCode::SchemaDeclaration);
    }

    #[test]
    fn test_bad_field_names_rejected() {
        assert!(FieldDef::int().attach("Test", "").is_err());
        assert!(FieldDef::int().attach("Test", "1abc").is_err());
        assert!(FieldDef::int().attach("Test", "has space").is_err());
        assert!(FieldDef::int().attach("Test", "_ok_1").is_ok());
    }

    #[test]
    fn test_default_checked_at_declaration() {
        let err = FieldDef::int().with_default("x").attach("Test", "field").unwrap_err();
        assert_eq!(err.code(), RecordErrorCode::SchemaDeclaration);
        assert!(err.message().contains("bad default"));

        let def = FieldDef::int().coerce().with_default("7").attach("Test", "field").unwrap();
        assert_eq!(def.default_value(), Some(json!(7)));
    }

    #[test]
    fn test_admit_type_mismatch() {
        let def = attached(FieldDef::int());
        assert_eq!(def.admit("Test", json!(1)).unwrap(), json!(1));

        let err = def.admit("Test", json!("42")).unwrap_err();
        assert_eq!(err.code(), RecordErrorCode::TypeMismatch);
        assert!(err.message().contains("expected int"));
        assert_eq!(err.details().unwrap().actual, "string");
    }

    #[test]
    fn test_admit_null_bypasses_type_check() {
        let def = attached(FieldDef::int());
        assert_eq!(def.admit("Test", Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_admit_coercion() {
        let def = attached(FieldDef::int().coerce());
        assert_eq!(def.admit("Test", json!("42")).unwrap(), json!(42));

        let err = def.admit("Test", json!("42.2")).unwrap_err();
        assert_eq!(err.code(), RecordErrorCode::CoercionFailed);
        assert!(err.message().contains("auto-coercion"));
        assert!(err.message().contains("42.2"));
        assert!(err.message().contains("int"));
    }

    #[test]
    fn test_admit_array_elements() {
        let def = FieldDef::array(FieldType::Int).attach("Test", "tags").unwrap();
        assert!(def.admit("Test", json!([1, 2, 3])).is_ok());

        let err = def.admit("Test", json!([1, "two"])).unwrap_err();
        assert_eq!(err.code(), RecordErrorCode::TypeMismatch);
        assert_eq!(err.field(), Some("tags[1]"));
    }

    #[test]
    fn test_zero_defaults() {
        let def = attached(FieldDef::array(FieldType::String).zero_default());
        assert_eq!(def.default_value(), Some(json!([])));
        assert!(FieldDef::any().zero_default().attach("Test", "field").is_err());
    }
}
