//! Format resolved layouts for display (offset/size table, one row per field).

use crate::ast::TypeExpr;
use crate::error::LayoutError;
use crate::template::StructDef;
use crate::token::{field_size, field_token};

/// One row of a layout table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutRow {
    /// Nesting depth (0 for top-level fields).
    pub depth: usize,
    /// Dotted field path, e.g. `header.len`.
    pub path: String,
    /// Declared type after specialization, e.g. `float32[10]`.
    pub ty: String,
    pub offset: usize,
    pub size: usize,
    pub token: String,
}

/// Rows for every field of a resolved struct, in serialization order.
///
/// Non-array struct fields are followed by the rows of their own fields.
/// Returns `Ok(None)` for templates, and the size error of a struct whose
/// packed size does not fit in `usize`.
pub fn layout_rows(def: &StructDef) -> Result<Option<Vec<LayoutRow>>, LayoutError> {
    if def.byte_size()?.is_none() {
        return Ok(None);
    }
    let mut rows = Vec::new();
    push_rows(def, "", 0, 0, &mut rows)?;
    Ok(Some(rows))
}

fn push_rows(
    def: &StructDef,
    prefix: &str,
    depth: usize,
    base: usize,
    rows: &mut Vec<LayoutRow>,
) -> Result<usize, LayoutError> {
    let mut offset = base;
    for f in def.fields() {
        let size = field_size(def.name(), f)?.unwrap_or_default();
        let path = if prefix.is_empty() {
            f.name.clone()
        } else {
            format!("{}.{}", prefix, f.name)
        };
        rows.push(LayoutRow {
            depth,
            path: path.clone(),
            ty: f.ty.to_string(),
            offset,
            size,
            token: field_token(f).unwrap_or_default(),
        });
        if let (TypeExpr::Struct(s), true) = (&f.ty.element, f.ty.dims.is_empty()) {
            push_rows(s, &path, depth + 1, offset, rows)?;
        }
        offset = offset.checked_add(size).ok_or_else(|| LayoutError::TooLarge {
            template: def.name().to_string(),
            what: "packed size",
        })?;
    }
    Ok(offset)
}

fn template_params(def: &StructDef) -> String {
    let free: Vec<&str> = def.free_params().iter().map(String::as_str).collect();
    free.join(", ")
}

/// Multi-line table: `offset size path: type token`.
pub fn format_layout(def: &StructDef) -> String {
    let rows = match layout_rows(def) {
        Ok(Some(r)) => r,
        Ok(None) => return format!("  <template: {}>\n", template_params(def)),
        Err(e) => return format!("  <{}>\n", e),
    };
    let mut out = String::new();
    for r in rows {
        out.push_str(&format!(
            "  {:>6} {:>6}  {}{}: {} [{}]\n",
            r.offset,
            r.size,
            "  ".repeat(r.depth),
            r.path,
            r.ty,
            r.token
        ));
    }
    out
}

/// One-line summary: `Name: token (N bytes)` or `Name: template <T, Tx>`.
///
/// A resolved struct whose packed size overflows `usize` still shows its token.
pub fn summary_line(label: &str, def: &StructDef) -> String {
    if !def.is_resolved() {
        return format!("{}: template <{}>", label, template_params(def));
    }
    let token = def.token_string().unwrap_or_default();
    match def.byte_size() {
        Ok(Some(size)) => format!("{}: {} ({} bytes)", label, token, size),
        _ => format!("{}: {} (size overflows usize)", label, token),
    }
}
