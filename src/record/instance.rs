//! Record instances
//!
//! A record stores one slot per schema field. Strict records reject every
//! other name; mixed records keep other names in an auxiliary ordered map
//! without type checking.
//!
//! Construction and `update` never leave a partially applied state: every
//! name and value is checked before the first slot is written.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::errors::{RecordError, RecordResult};
use super::record_type::{Mode, RecordType};
use super::types::Coercible;
use crate::observability::log_rejection;

/// Storage for names outside the schema
#[derive(Debug, Clone, PartialEq)]
enum Extras {
    Sealed,
    Open(BTreeMap<String, Value>),
}

/// Where a staged value is written
enum Target {
    Slot(usize),
    Extra(String),
}

/// An instance of a record type.
#[derive(Debug, Clone)]
pub struct Record {
    ty: Arc<RecordType>,
    slots: Vec<Option<Value>>,
    extras: Extras,
}

impl Record {
    /// Constructs a record from named values.
    ///
    /// Supplied values are validated and coerced; unsupplied fields take
    /// their default. A required field without value fails construction.
    pub fn new<K, I>(ty: &Arc<RecordType>, values: I) -> RecordResult<Self>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let values: Vec<(String, Value)> = values.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self::build(ty, values).inspect_err(log_rejection)
    }

    fn build(ty: &Arc<RecordType>, values: Vec<(String, Value)>) -> RecordResult<Self> {
        let mut record = Record {
            ty: Arc::clone(ty),
            slots: vec![None; ty.schema().len()],
            extras: match ty.mode() {
                Mode::Strict => Extras::Sealed,
                Mode::Mixed => Extras::Open(BTreeMap::new()),
            },
        };

        let staged = record.stage(values)?;
        let supplied: Vec<bool> = {
            let mut supplied = vec![false; record.slots.len()];
            for (target, _) in &staged {
                if let Target::Slot(i) = target {
                    supplied[*i] = true;
                }
            }
            supplied
        };

        for (i, field) in ty.schema().iter().enumerate() {
            if supplied[i] {
                continue;
            }
            match field.default_value() {
                Some(default) => record.slots[i] = Some(default),
                None if field.is_required() => {
                    return Err(RecordError::missing_required(ty.name(), field.name()));
                }
                None => {}
            }
        }

        record.apply(staged);
        Ok(record)
    }

    /// Checks names, then validates every value. Nothing is written.
    fn stage(&self, values: Vec<(String, Value)>) -> RecordResult<Vec<(Target, Value)>> {
        let schema = self.ty.schema();

        if matches!(self.extras, Extras::Sealed) {
            let mut unknown: Vec<&str> = values
                .iter()
                .map(|(k, _)| k.as_str())
                .filter(|k| !schema.contains(k))
                .collect();
            if !unknown.is_empty() {
                unknown.sort_unstable();
                unknown.dedup();
                return Err(RecordError::invalid_arguments(self.ty.name(), &unknown));
            }
        }

        let mut staged = Vec::with_capacity(values.len());
        for (name, value) in values {
            match schema.lookup(&name) {
                Some((i, field)) => {
                    staged.push((Target::Slot(i), field.admit(self.ty.name(), value)?));
                }
                None => staged.push((Target::Extra(name), value)),
            }
        }
        Ok(staged)
    }

    fn apply(&mut self, staged: Vec<(Target, Value)>) {
        for (target, value) in staged {
            match target {
                Target::Slot(i) => self.slots[i] = Some(value),
                Target::Extra(name) => {
                    if let Extras::Open(extras) = &mut self.extras {
                        extras.insert(name, value);
                    }
                }
            }
        }
    }

    /// The record's type
    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.ty
    }

    /// Gets the value of a field or extra attribute
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self.ty.schema().position(name) {
            Some(i) => self.slots[i].as_ref(),
            None => match &self.extras {
                Extras::Open(extras) => extras.get(name),
                Extras::Sealed => None,
            },
        }
    }

    /// Gets a value as `T`, without conversion.
    ///
    /// Returns `None` when the field is declared with a type other than
    /// the one `T` stands for.
    pub fn get_as<T: Coercible>(&self, name: &str) -> Option<T> {
        let declared = self.ty.field(name).and_then(|f| f.declared_type());
        if declared.is_some_and(|ty| *ty != T::field_type()) {
            return None;
        }
        self.get(name).and_then(T::from_value)
    }

    /// Whether `name` currently holds a value
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Assigns a single attribute.
    ///
    /// Strict records only accept declared (own or inherited) field names.
    pub fn set(&mut self, name: &str, value: Value) -> RecordResult<()> {
        self.set_inner(name, value).inspect_err(log_rejection)
    }

    fn set_inner(&mut self, name: &str, value: Value) -> RecordResult<()> {
        let schema = self.ty.schema();
        match (schema.lookup(name), &mut self.extras) {
            (Some((i, field)), _) => {
                self.slots[i] = Some(field.admit(self.ty.name(), value)?);
            }
            (None, Extras::Open(extras)) => {
                extras.insert(name.to_string(), value);
            }
            (None, Extras::Sealed) => {
                return Err(RecordError::attribute_not_found(self.ty.name(), name));
            }
        }
        Ok(())
    }

    /// Assigns several attributes at once. Either all are applied or none.
    pub fn update<K, I>(&mut self, values: I) -> RecordResult<()>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let values: Vec<(String, Value)> = values.into_iter().map(|(k, v)| (k.into(), v)).collect();
        let staged = self.stage(values).inspect_err(log_rejection)?;
        self.apply(staged);
        Ok(())
    }

    /// Clears a field or removes an extra attribute, returning the old value.
    ///
    /// Required fields cannot be cleared; assign null instead.
    pub fn unset(&mut self, name: &str) -> RecordResult<Option<Value>> {
        self.unset_inner(name).inspect_err(log_rejection)
    }

    fn unset_inner(&mut self, name: &str) -> RecordResult<Option<Value>> {
        match (self.ty.schema().lookup(name), &mut self.extras) {
            (Some((_, field)), _) if field.is_required() => {
                Err(RecordError::missing_required(self.ty.name(), name))
            }
            (Some((i, _)), _) => Ok(self.slots[i].take()),
            (None, Extras::Open(extras)) => Ok(extras.remove(name)),
            (None, Extras::Sealed) => Err(RecordError::attribute_not_found(self.ty.name(), name)),
        }
    }

    /// Fills unset or null schema fields that have a default.
    ///
    /// Returns the names of the fields filled.
    pub fn setdefaults(&mut self) -> Vec<String> {
        let mut filled = Vec::new();
        for (i, field) in self.ty.schema().iter().enumerate() {
            let empty = matches!(self.slots[i], None | Some(Value::Null));
            if !empty {
                continue;
            }
            if let Some(default) = field.default_value() {
                if default.is_null() {
                    continue;
                }
                self.slots[i] = Some(default);
                filled.push(field.name().to_string());
            }
        }
        filled
    }

    /// Names holding a value: schema fields first, then extras
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.items().map(|(name, _)| name)
    }

    /// Name/value pairs holding a value: schema fields in schema order,
    /// then extras ordered by name
    pub fn items(&self) -> impl Iterator<Item = (&str, &Value)> {
        let declared = self
            .ty
            .schema()
            .iter()
            .zip(self.slots.iter())
            .filter_map(|(field, slot)| slot.as_ref().map(|v| (field.name(), v)));
        let extra = match &self.extras {
            Extras::Open(extras) => Some(extras.iter().map(|(k, v)| (k.as_str(), v))),
            Extras::Sealed => None,
        };
        declared.chain(extra.into_iter().flatten())
    }

    /// Extra attributes of a mixed record, ordered by name
    pub fn extra_fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        let extras = match &self.extras {
            Extras::Open(extras) => Some(extras.iter().map(|(k, v)| (k.as_str(), v))),
            Extras::Sealed => None,
        };
        extras.into_iter().flatten()
    }
}

/// Records are equal when they share the same type (by identity, not by
/// name) and hold the same values.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.ty, &other.ty) && self.items().eq(other.items())
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.ty.name())?;
        for (name, value) in self.items() {
            write!(f, " {}={}", name, value)?;
        }
        write!(f, ">")
    }
}
