//! Schema resolution across an inheritance chain
//!
//! The resolved schema of a record type is the merge of the own field
//! declarations of every type on its chain, most distant ancestor first.
//! A redeclared name replaces the inherited descriptor in place.

use std::collections::HashMap;

use super::types::FieldDef;

/// Resolved, immutable field set of a record type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: Vec<FieldDef>,
    index: HashMap<String, usize>,
}

impl Schema {
    /// Returns the number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Gets a field descriptor by name
    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.position(name).map(|i| &self.fields[i])
    }

    /// Slot position and descriptor of a field
    pub fn lookup(&self, name: &str) -> Option<(usize, &FieldDef)> {
        self.position(name).map(|i| (i, &self.fields[i]))
    }

    /// Slot position of a field
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Fields in slot order
    pub fn iter(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(FieldDef::name)
    }

    /// Fields ordered by name
    pub fn sorted(&self) -> Vec<&FieldDef> {
        let mut sorted: Vec<_> = self.fields.iter().collect();
        sorted.sort_by(|a, b| a.name().cmp(b.name()));
        sorted
    }

    fn insert(&mut self, field: FieldDef) {
        match self.index.get(field.name()) {
            Some(&i) => self.fields[i] = field,
            None => {
                self.index.insert(field.name().to_string(), self.fields.len());
                self.fields.push(field);
            }
        }
    }
}

/// Computes schemas from own and inherited declarations.
pub struct SchemaResolver;

impl SchemaResolver {
    /// Resolves the schema of a type.
    ///
    /// `ancestors` holds the own declarations of each ancestor, nearest
    /// first. Field names in `own` must already be unique.
    pub fn resolve(own: &[FieldDef], ancestors: &[&[FieldDef]]) -> Schema {
        let mut schema = Schema::default();

        for declared in ancestors.iter().rev() {
            for field in declared.iter() {
                schema.insert(field.clone());
            }
        }
        for field in own {
            schema.insert(field.clone());
        }

        schema
    }
}
