//! Named declarations collected from a schema source: parameters, structs, and
//! stored (possibly partial) specializations.

use crate::ast::{FieldType, TypeParam};
use crate::primitive;
use crate::template::StructDef;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
enum NameRef {
    Param(usize),
    Type(usize),
}

/// Declarations in source order. Structs and `let` aliases share one namespace
/// with parameters; primitive names are reserved.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    params: Vec<TypeParam>,
    types: Vec<(String, FieldType)>,
    names: HashMap<String, NameRef>,
}

impl Schema {
    /// Declared parameters, in declaration order.
    pub fn params(&self) -> &[TypeParam] {
        &self.params
    }

    /// Structs and aliases, in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &FieldType)> {
        self.types.iter().map(|(n, t)| (n.as_str(), t))
    }

    pub fn get(&self, name: &str) -> Option<&FieldType> {
        match self.names.get(name)? {
            NameRef::Type(i) => Some(&self.types[*i].1),
            NameRef::Param(_) => None,
        }
    }

    /// The struct stored under `name`, if that entry is a struct without dims.
    pub fn get_struct(&self, name: &str) -> Option<&Arc<StructDef>> {
        self.get(name)?.as_struct()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// True if `name` is a primitive, a parameter, or a declared type.
    pub fn is_defined(&self, name: &str) -> bool {
        primitive::is_reserved(name) || self.names.contains_key(name)
    }

    /// Resolve a name used in a type position.
    pub(crate) fn lookup(&self, name: &str) -> Option<FieldType> {
        if let Some(p) = primitive::lookup(name) {
            return Some(FieldType::new(p));
        }
        match self.names.get(name)? {
            NameRef::Param(i) => Some(FieldType::new(self.params[*i].clone())),
            NameRef::Type(i) => Some(self.types[*i].1.clone()),
        }
    }

    /// Returns false if the name is already taken.
    pub(crate) fn insert_param(&mut self, name: &str) -> bool {
        if self.is_defined(name) {
            return false;
        }
        self.names.insert(name.to_string(), NameRef::Param(self.params.len()));
        self.params.push(TypeParam::new(name));
        true
    }

    /// Returns false if the name is already taken.
    pub(crate) fn insert_type(&mut self, name: &str, ty: FieldType) -> bool {
        if self.is_defined(name) {
            return false;
        }
        self.names.insert(name.to_string(), NameRef::Type(self.types.len()));
        self.types.push((name.to_string(), ty));
        true
    }
}
