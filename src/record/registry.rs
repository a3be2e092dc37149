//! Registry of named record types
//!
//! Types are immutable: a name is bound once and a second registration under
//! the same name is rejected. Declarations that extend another type are
//! resolved against types already in the registry.

use std::collections::HashMap;
use std::sync::Arc;

use super::decl::RecordTypeDecl;
use super::errors::{RecordError, RecordResult};
use super::instance::Record;
use super::record_type::RecordType;
use super::snapshot::Snapshot;
use crate::observability::{log_event, Event};

/// In-memory registry of record types indexed by name.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<String, Arc<RecordType>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a built type.
    pub fn register(&mut self, ty: Arc<RecordType>) -> RecordResult<()> {
        if self.types.contains_key(ty.name()) {
            return Err(RecordError::type_already_defined(ty.name()));
        }

        log_event(
            Event::TypeRegistered,
            &[("mode", ty.mode().to_string().as_str()), ("type", ty.name())],
        );
        self.types.insert(ty.name().to_string(), ty);
        Ok(())
    }

    /// Builds and registers a declared type.
    pub fn define(&mut self, decl: &RecordTypeDecl) -> RecordResult<Arc<RecordType>> {
        if self.types.contains_key(&decl.name) {
            return Err(RecordError::type_already_defined(&decl.name));
        }

        let parent = match &decl.extends {
            Some(name) => Some(self.require(name)?),
            None => None,
        };
        let ty = decl.build(parent.as_ref())?;
        self.register(Arc::clone(&ty))?;
        Ok(ty)
    }

    /// Parses, builds and registers a JSON declaration.
    pub fn define_json(&mut self, content: &str) -> RecordResult<Arc<RecordType>> {
        let decl = RecordTypeDecl::from_json(content)?;
        self.define(&decl)
    }

    /// Gets a type by name.
    pub fn get(&self, name: &str) -> Option<&Arc<RecordType>> {
        self.types.get(name)
    }

    /// Gets a type by name, failing if it is not registered.
    pub fn require(&self, name: &str) -> RecordResult<Arc<RecordType>> {
        self.get(name)
            .cloned()
            .ok_or_else(|| RecordError::unknown_type(name))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Returns all registered types.
    pub fn all_types(&self) -> impl Iterator<Item = &Arc<RecordType>> {
        self.types.values()
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Restores a snapshot into the registered type it names.
    pub fn restore(&self, snapshot: &Snapshot) -> RecordResult<Record> {
        let ty = self.require(&snapshot.type_name)?;
        snapshot.restore(&ty)
    }
}
