//! Packed-format token strings and sizes of fully resolved structs.
//!
//! A field contributes its element token (a primitive's format code or a nested
//! struct's whole token string) repeated by the product of its dimensions.
//! Primitive elements use the count-prefixed form (`100f`); nested struct
//! tokens are repeated literally (`100f100f`), since the codec only accepts a
//! count before a single format code.
//!
//! Dimension products are exact, so a count prefix never overflows. The token
//! length of a resolved struct is checked when the struct is built; layouts
//! whose token could not be held in a `String` are rejected there.

use crate::ast::{ArrayDim, Field, TypeExpr};
use crate::error::LayoutError;
use crate::template::StructDef;
use std::fmt;

const LIMB: u64 = 1_000_000_000;
const MAX_TOKEN_LEN: usize = isize::MAX as usize;

/// Exact product of literal dimensions, as little-endian base-10^9 limbs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Count(Vec<u32>);

impl Count {
    fn one() -> Self {
        Count(vec![1])
    }

    fn mul(&mut self, n: u64) {
        let base = u128::from(LIMB);
        let mut carry = 0u128;
        for limb in self.0.iter_mut() {
            let v = u128::from(*limb) * u128::from(n) + carry;
            *limb = (v % base) as u32;
            carry = v / base;
        }
        while carry > 0 {
            self.0.push((carry % base) as u32);
            carry /= base;
        }
        while self.0.len() > 1 && self.0.last() == Some(&0) {
            self.0.pop();
        }
    }

    pub(crate) fn to_usize(&self) -> Option<usize> {
        self.0
            .iter()
            .rev()
            .try_fold(0usize, |acc, &l| acc.checked_mul(LIMB as usize)?.checked_add(l as usize))
    }

    /// `self * each`, or `None` if it does not fit in usize.
    pub(crate) fn times(&self, each: usize) -> Option<usize> {
        if each == 0 || self.0.iter().all(|&l| l == 0) {
            return Some(0);
        }
        self.to_usize()?.checked_mul(each)
    }
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut limbs = self.0.iter().rev();
        if let Some(top) = limbs.next() {
            write!(f, "{}", top)?;
        }
        for l in limbs {
            write!(f, "{:09}", l)?;
        }
        Ok(())
    }
}

impl StructDef {
    /// Token string, or `None` while free parameters remain.
    ///
    /// Computed once per struct value and cached.
    pub fn token_string(&self) -> Option<&str> {
        self.token_cell().get_or_init(|| synthesize(self)).as_deref()
    }

    /// Packed size in bytes (no alignment).
    ///
    /// `Ok(None)` while free parameters remain; [`LayoutError::TooLarge`] if the
    /// size of a resolved struct does not fit in `usize`.
    pub fn byte_size(&self) -> Result<Option<usize>, LayoutError> {
        if !self.is_resolved() {
            return Ok(None);
        }
        let mut total = 0usize;
        for f in self.fields() {
            let size = match field_size(self.name(), f)? {
                Some(size) => size,
                None => return Ok(None),
            };
            total = total.checked_add(size).ok_or_else(|| too_large(self.name(), "packed size"))?;
        }
        Ok(Some(total))
    }
}

fn too_large(template: &str, what: &'static str) -> LayoutError {
    LayoutError::TooLarge {
        template: template.to_string(),
        what,
    }
}

/// Product of literal dimensions; `None` if any dimension is still a parameter.
pub(crate) fn element_count(dims: &[ArrayDim]) -> Option<Count> {
    dims.iter().try_fold(Count::one(), |mut acc, d| match d {
        ArrayDim::Literal(n) => {
            acc.mul(*n);
            Some(acc)
        }
        ArrayDim::Param(_) => None,
    })
}

/// Packed size of one field; `Ok(None)` if it still mentions a parameter.
pub(crate) fn field_size(template: &str, field: &Field) -> Result<Option<usize>, LayoutError> {
    let count = match element_count(&field.ty.dims) {
        Some(c) => c,
        None => return Ok(None),
    };
    let each = match &field.ty.element {
        TypeExpr::Primitive(p) => p.byte_size(),
        TypeExpr::Struct(s) => match s.byte_size()? {
            Some(n) => n,
            None => return Ok(None),
        },
        TypeExpr::Param(_) => return Ok(None),
    };
    count
        .times(each)
        .map(Some)
        .ok_or_else(|| too_large(template, "packed size"))
}

/// Length of the token string of fully resolved fields.
///
/// Nested structs must already carry their own length.
pub(crate) fn token_len(template: &str, fields: &[Field]) -> Result<Option<usize>, LayoutError> {
    let mut total = 0usize;
    for f in fields {
        let count = match element_count(&f.ty.dims) {
            Some(c) => c,
            None => return Ok(None),
        };
        let len = match &f.ty.element {
            TypeExpr::Primitive(_) if f.ty.dims.is_empty() => 1,
            TypeExpr::Primitive(_) => count.to_string().len() + 1,
            TypeExpr::Struct(s) => match s.token_len() {
                Some(inner) => count.times(inner).ok_or_else(|| too_large(template, "token string"))?,
                None => return Ok(None),
            },
            TypeExpr::Param(_) => return Ok(None),
        };
        total = total
            .checked_add(len)
            .filter(|t| *t <= MAX_TOKEN_LEN)
            .ok_or_else(|| too_large(template, "token string"))?;
    }
    Ok(Some(total))
}

fn synthesize(def: &StructDef) -> Option<String> {
    let len = match def.token_len() {
        Some(len) => len,
        None => {
            tracing::trace!(name = %def.name(), "unresolved, no token");
            return None;
        }
    };
    let mut out = String::with_capacity(len);
    for f in def.fields() {
        out.push_str(&field_token(f)?);
    }
    tracing::trace!(name = %def.name(), len = out.len(), "synthesized token");
    Some(out)
}

pub(crate) fn field_token(field: &Field) -> Option<String> {
    let count = element_count(&field.ty.dims)?;
    match &field.ty.element {
        TypeExpr::Primitive(p) if field.ty.dims.is_empty() => Some(p.format_code().to_string()),
        TypeExpr::Primitive(p) => Some(format!("{}{}", count, p.format_code())),
        TypeExpr::Struct(s) => {
            let inner = s.token_string()?;
            if inner.is_empty() {
                return Some(String::new());
            }
            // bounded by token_len when the enclosing struct was built
            Some(inner.repeat(count.to_usize()?))
        }
        TypeExpr::Param(_) => None,
    }
}
