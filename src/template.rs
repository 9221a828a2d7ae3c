//! Struct templates: ordered fields plus the derived set of free parameters.

use crate::ast::{ArrayDim, Field, TypeExpr};
use crate::error::LayoutError;
use crate::token;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// A struct layout, either a template (free parameters remain) or fully resolved.
///
/// Values are immutable and shared through `Arc`; specializing one yields a new
/// value and leaves the input reusable.
#[derive(Debug)]
pub struct StructDef {
    name: String,
    fields: Vec<Field>,
    free_params: BTreeSet<String>,
    /// Own parameters never bound nor forwarded. Must be empty to nest this struct.
    unforwarded: BTreeSet<String>,
    /// Token length, known as soon as the struct is resolved.
    token_len: Option<usize>,
    token: OnceLock<Option<String>>,
}

impl StructDef {
    /// Declare a struct from its fields, in serialization order.
    ///
    /// Every parameter appearing in the fields (including free parameters of
    /// nested structs) becomes a free parameter of the new struct. A resolved
    /// struct whose token string could not be held in memory is rejected.
    pub fn define(name: impl Into<String>, fields: Vec<Field>) -> Result<Arc<Self>, LayoutError> {
        let name = name.into();
        let mut seen = HashSet::new();
        for f in &fields {
            if !seen.insert(f.name.as_str()) {
                return Err(LayoutError::DuplicateField {
                    template: name,
                    field: f.name.clone(),
                });
            }
            if let TypeExpr::Struct(nested) = &f.ty.element {
                check_nestable(&name, nested)?;
            }
        }
        let unforwarded = collect_free_params(&fields);
        tracing::trace!(%name, fields = fields.len(), free = unforwarded.len(), "define struct");
        Self::from_parts(name, fields, unforwarded)
    }

    /// Assemble a struct from validated fields, sizing its token if resolved.
    pub(crate) fn from_parts(
        name: String,
        fields: Vec<Field>,
        unforwarded: BTreeSet<String>,
    ) -> Result<Arc<Self>, LayoutError> {
        let free_params = collect_free_params(&fields);
        let token_len = if free_params.is_empty() {
            token::token_len(&name, &fields)?
        } else {
            None
        };
        Ok(Arc::new(StructDef {
            name,
            fields,
            free_params,
            unforwarded,
            token_len,
            token: OnceLock::new(),
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of parameters not yet bound, including those of nested structs.
    pub fn free_params(&self) -> &BTreeSet<String> {
        &self.free_params
    }

    /// Free parameters that were declared by this struct (or its template) and
    /// never bound or forwarded to an enclosing parameter.
    pub fn unforwarded_params(&self) -> &BTreeSet<String> {
        &self.unforwarded
    }

    /// True when no free parameters remain.
    pub fn is_resolved(&self) -> bool {
        self.free_params.is_empty()
    }

    /// Length of the token string, or `None` while free parameters remain.
    pub fn token_len(&self) -> Option<usize> {
        self.token_len
    }

    pub(crate) fn token_cell(&self) -> &OnceLock<Option<String>> {
        &self.token
    }
}

impl PartialEq for StructDef {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other) || (self.name == other.name && self.fields == other.fields)
    }
}

impl fmt::Display for StructDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A struct can be used as a concrete field type only if all of its own
/// parameters were bound or forwarded.
pub(crate) fn check_nestable(outer: &str, nested: &StructDef) -> Result<(), LayoutError> {
    if nested.unforwarded.is_empty() {
        Ok(())
    } else {
        Err(LayoutError::IncompleteSpecialization {
            template: outer.to_string(),
            nested: nested.name.clone(),
            unbound: nested.unforwarded.iter().cloned().collect(),
        })
    }
}

fn collect_free_params(fields: &[Field]) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    for f in fields {
        match &f.ty.element {
            TypeExpr::Param(p) => {
                out.insert(p.name().to_string());
            }
            TypeExpr::Struct(s) => out.extend(s.free_params.iter().cloned()),
            TypeExpr::Primitive(_) => {}
        }
        for d in &f.ty.dims {
            if let ArrayDim::Param(p) = d {
                out.insert(p.name().to_string());
            }
        }
    }
    out
}
