//! Field declarations: type expressions, array dimensions, binding arguments.

use crate::error::LayoutError;
use crate::primitive::PrimitiveType;
use crate::template::StructDef;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Named placeholder for an element type or an array length.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeParam(String);

impl TypeParam {
    pub fn new(name: impl Into<String>) -> Self {
        TypeParam(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Element type of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Primitive(PrimitiveType),
    Struct(Arc<StructDef>),
    Param(TypeParam),
}

impl From<PrimitiveType> for TypeExpr {
    fn from(p: PrimitiveType) -> Self {
        TypeExpr::Primitive(p)
    }
}

impl From<Arc<StructDef>> for TypeExpr {
    fn from(s: Arc<StructDef>) -> Self {
        TypeExpr::Struct(s)
    }
}

impl From<TypeParam> for TypeExpr {
    fn from(p: TypeParam) -> Self {
        TypeExpr::Param(p)
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Primitive(p) => write!(f, "{}", p),
            TypeExpr::Struct(s) => f.write_str(s.name()),
            TypeExpr::Param(p) => write!(f, "{}", p),
        }
    }
}

/// One array dimension: a fixed count or a length parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArrayDim {
    Literal(u64),
    Param(TypeParam),
}

impl TryFrom<Arg> for ArrayDim {
    type Error = LayoutError;

    fn try_from(arg: Arg) -> Result<Self, Self::Error> {
        match arg {
            Arg::Length(0) => Err(LayoutError::InvalidDimension("0".to_string())),
            Arg::Length(n) => Ok(ArrayDim::Literal(n)),
            Arg::Type(ty) => match ty.as_param() {
                Some(p) => Ok(ArrayDim::Param(p.clone())),
                None => Err(LayoutError::InvalidDimension(ty.to_string())),
            },
        }
    }
}

impl fmt::Display for ArrayDim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayDim::Literal(n) => write!(f, "{}", n),
            ArrayDim::Param(p) => write!(f, "{}", p),
        }
    }
}

/// Element type plus array dimensions, outermost first.
///
/// Used both as the declared type of a [`Field`] and as the value bound to a
/// type parameter (so `char[10]` can be bound to `T`).
#[derive(Debug, Clone, PartialEq)]
pub struct FieldType {
    pub element: TypeExpr,
    pub dims: Vec<ArrayDim>,
}

impl FieldType {
    pub fn new(element: impl Into<TypeExpr>) -> Self {
        FieldType {
            element: element.into(),
            dims: Vec::new(),
        }
    }

    /// Append an inner dimension. `float32[10][20]` is
    /// `FieldType::new(FLOAT32).dim(10u64)?.dim(20u64)?`.
    pub fn dim(mut self, arg: impl Into<Arg>) -> Result<Self, LayoutError> {
        self.dims.push(ArrayDim::try_from(arg.into())?);
        Ok(self)
    }

    /// The parameter this type forwards, if it is a bare parameter without dims.
    pub fn as_param(&self) -> Option<&TypeParam> {
        match (&self.element, self.dims.is_empty()) {
            (TypeExpr::Param(p), true) => Some(p),
            _ => None,
        }
    }

    /// The struct this type names, if it is a struct without dims.
    pub fn as_struct(&self) -> Option<&Arc<StructDef>> {
        match (&self.element, self.dims.is_empty()) {
            (TypeExpr::Struct(s), true) => Some(s),
            _ => None,
        }
    }
}

impl From<PrimitiveType> for FieldType {
    fn from(p: PrimitiveType) -> Self {
        FieldType::new(p)
    }
}

impl From<Arc<StructDef>> for FieldType {
    fn from(s: Arc<StructDef>) -> Self {
        FieldType::new(s)
    }
}

impl From<TypeParam> for FieldType {
    fn from(p: TypeParam) -> Self {
        FieldType::new(p)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.element)?;
        for d in &self.dims {
            write!(f, "[{}]", d)?;
        }
        Ok(())
    }
}

/// A named slot in a struct. Field order is serialization order.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: FieldType,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: impl Into<FieldType>) -> Self {
        Field {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// Value bound to a parameter: a type (possibly an array type) or a length.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Type(FieldType),
    Length(u64),
}

impl From<FieldType> for Arg {
    fn from(t: FieldType) -> Self {
        Arg::Type(t)
    }
}

impl From<PrimitiveType> for Arg {
    fn from(p: PrimitiveType) -> Self {
        Arg::Type(p.into())
    }
}

impl From<Arc<StructDef>> for Arg {
    fn from(s: Arc<StructDef>) -> Self {
        Arg::Type(s.into())
    }
}

impl From<TypeParam> for Arg {
    fn from(p: TypeParam) -> Self {
        Arg::Type(p.into())
    }
}

impl From<u64> for Arg {
    fn from(n: u64) -> Self {
        Arg::Length(n)
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Type(t) => write!(f, "{}", t),
            Arg::Length(n) => write!(f, "{}", n),
        }
    }
}

/// Arguments for [`StructDef::specialize`].
#[derive(Debug, Clone, PartialEq)]
pub enum Bindings {
    /// Parameter name to value.
    Named(BTreeMap<String, Arg>),
    /// Shorthand for a template with exactly one free parameter.
    Single(Arg),
}

impl Bindings {
    /// Empty named bindings.
    pub fn new() -> Self {
        Bindings::Named(BTreeMap::new())
    }

    pub fn single(arg: impl Into<Arg>) -> Self {
        Bindings::Single(arg.into())
    }

    /// Add a named binding. Turns a `Single` into an empty map first.
    pub fn bind(self, name: impl Into<String>, arg: impl Into<Arg>) -> Self {
        let mut map = match self {
            Bindings::Named(m) => m,
            Bindings::Single(_) => BTreeMap::new(),
        };
        map.insert(name.into(), arg.into());
        Bindings::Named(map)
    }
}

impl Default for Bindings {
    fn default() -> Self {
        Bindings::new()
    }
}

impl<K: Into<String>> FromIterator<(K, Arg)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (K, Arg)>>(iter: I) -> Self {
        Bindings::Named(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::{BYTE, FLOAT32, INT32};

    #[test]
    fn dims_are_outermost_first() {
        let ty = FieldType::new(FLOAT32)
            .dim(10u64)
            .and_then(|t| t.dim(TypeParam::new("Tx")))
            .expect("valid dims");
        assert_eq!(
            ty.dims,
            vec![ArrayDim::Literal(10), ArrayDim::Param(TypeParam::new("Tx"))]
        );
        assert_eq!(ty.to_string(), "float32[10][Tx]");
    }

    #[test]
    fn primitive_as_dimension_rejected() {
        let err = FieldType::new(INT32).dim(FLOAT32).unwrap_err();
        assert_eq!(err, LayoutError::InvalidDimension("float32".to_string()));
    }

    #[test]
    fn zero_dimension_rejected() {
        assert!(FieldType::new(BYTE).dim(0u64).is_err());
    }

    #[test]
    fn array_param_is_not_a_dimension() {
        let arr = FieldType::new(TypeParam::new("T")).dim(2u64).expect("dim");
        assert!(matches!(
            FieldType::new(INT32).dim(arr),
            Err(LayoutError::InvalidDimension(s)) if s == "T[2]"
        ));
    }

    #[test]
    fn bind_builds_named_map() {
        let b = Bindings::single(INT32).bind("T", INT32).bind("Tx", 2u64);
        match b {
            Bindings::Named(m) => {
                assert_eq!(m.len(), 2);
                assert_eq!(m.get("Tx"), Some(&Arg::Length(2)));
            }
            Bindings::Single(_) => panic!("expected named bindings"),
        }
    }
}
