//! Binding template parameters to types and lengths.
//!
//! Specialization is simultaneous substitution over the field tree: each
//! parameter occurrence is replaced once by its bound value, and bindings whose
//! names are free in a nested struct are forwarded into it. Unbound parameters
//! stay free, so binding a subset yields a partial specialization that can be
//! stored and specialized again.

use crate::ast::{Arg, ArrayDim, Bindings, Field, FieldType, TypeExpr};
use crate::error::LayoutError;
use crate::template::{check_nestable, StructDef};
use std::collections::BTreeMap;
use std::sync::Arc;

impl StructDef {
    /// Bind some or all free parameters, returning a new struct.
    ///
    /// Fails if a key names no free parameter, if a bare argument is given to a
    /// struct without exactly one free parameter, if a length parameter receives
    /// anything but a positive integer (or a forwarded parameter), or if a bound
    /// struct still has unbound parameters of its own. A resolved result whose
    /// token string could not be held in memory is [`LayoutError::TooLarge`].
    #[tracing::instrument(level = "debug", skip_all, fields(template = %self.name()))]
    pub fn specialize(self: &Arc<Self>, bindings: Bindings) -> Result<Arc<StructDef>, LayoutError> {
        let map = match bindings {
            Bindings::Named(map) => map,
            Bindings::Single(arg) => {
                let mut free = self.free_params().iter();
                match (free.next(), free.next()) {
                    (Some(only), None) => BTreeMap::from([(only.clone(), arg)]),
                    _ => {
                        return Err(LayoutError::BareBindingArity {
                            template: self.name().to_string(),
                            free: self.free_params().len(),
                        })
                    }
                }
            }
        };

        if let Some(unknown) = map.keys().find(|k| !self.free_params().contains(*k)) {
            return Err(LayoutError::UnknownParameter {
                template: self.name().to_string(),
                param: unknown.clone(),
            });
        }
        for arg in map.values() {
            if let Arg::Type(FieldType {
                element: TypeExpr::Struct(s),
                ..
            }) = arg
            {
                check_nestable(self.name(), s)?;
            }
        }
        if map.is_empty() {
            tracing::debug!("no bindings");
            return Ok(Arc::clone(self));
        }

        let fields = self
            .fields()
            .iter()
            .map(|f| substitute_field(self.name(), f, &map))
            .collect::<Result<Vec<_>, _>>()?;
        let unforwarded = self
            .unforwarded_params()
            .iter()
            .filter(|p| !map.contains_key(*p))
            .cloned()
            .collect();
        let name = specialized_name(self.name(), &map);
        let out = StructDef::from_parts(name, fields, unforwarded)?;
        tracing::debug!(
            bound = map.len(),
            remaining = out.free_params().len(),
            name = %out.name(),
            "specialized"
        );
        Ok(out)
    }
}

fn substitute_field(template: &str, field: &Field, map: &BTreeMap<String, Arg>) -> Result<Field, LayoutError> {
    let mut dims = Vec::with_capacity(field.ty.dims.len());
    for d in &field.ty.dims {
        dims.push(substitute_dim(template, d, map)?);
    }
    let element = match &field.ty.element {
        TypeExpr::Param(p) => match map.get(p.name()) {
            Some(Arg::Type(bound)) => {
                dims.extend(bound.dims.iter().cloned());
                bound.element.clone()
            }
            Some(Arg::Length(n)) => {
                return Err(LayoutError::TypeExpected {
                    template: template.to_string(),
                    param: p.name().to_string(),
                    found: *n,
                })
            }
            None => TypeExpr::Param(p.clone()),
        },
        TypeExpr::Struct(nested) => {
            let forwarded: BTreeMap<String, Arg> = map
                .iter()
                .filter(|(k, _)| nested.free_params().contains(*k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            if forwarded.is_empty() {
                TypeExpr::Struct(Arc::clone(nested))
            } else {
                tracing::trace!(field = %field.name, nested = %nested.name(), count = forwarded.len(), "forward bindings");
                TypeExpr::Struct(nested.specialize(Bindings::Named(forwarded))?)
            }
        }
        TypeExpr::Primitive(p) => TypeExpr::Primitive(*p),
    };
    Ok(Field {
        name: field.name.clone(),
        ty: FieldType { element, dims },
    })
}

fn substitute_dim(template: &str, dim: &ArrayDim, map: &BTreeMap<String, Arg>) -> Result<ArrayDim, LayoutError> {
    let p = match dim {
        ArrayDim::Literal(_) => return Ok(dim.clone()),
        ArrayDim::Param(p) => p,
    };
    match map.get(p.name()) {
        None => Ok(dim.clone()),
        Some(Arg::Length(0)) => Err(LayoutError::ZeroLength {
            template: template.to_string(),
            param: p.name().to_string(),
        }),
        Some(Arg::Length(n)) => Ok(ArrayDim::Literal(*n)),
        Some(Arg::Type(ty)) => match ty.as_param() {
            Some(forward) => Ok(ArrayDim::Param(forward.clone())),
            None => Err(LayoutError::LengthNotInteger {
                template: template.to_string(),
                param: p.name().to_string(),
                found: ty.to_string(),
            }),
        },
    }
}

/// `Name<K=V, ...>` with keys in sorted order.
fn specialized_name(base: &str, map: &BTreeMap<String, Arg>) -> String {
    let args: Vec<String> = map.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    format!("{}<{}>", base, args.join(", "))
}
