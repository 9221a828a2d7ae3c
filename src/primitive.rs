//! Primitive element types: fixed registry of format codes and byte sizes.

use std::fmt;

/// Kind of value a primitive holds once unpacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Integer,
    Float,
    ByteString,
}

/// A primitive element type (one format code, fixed size).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrimitiveType {
    name: &'static str,
    format_code: char,
    byte_size: usize,
    value_kind: ValueKind,
}

impl PrimitiveType {
    const fn new(name: &'static str, format_code: char, byte_size: usize, value_kind: ValueKind) -> Self {
        PrimitiveType {
            name,
            format_code,
            byte_size,
            value_kind,
        }
    }

    /// Canonical registry name (aliases resolve to the canonical entry).
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn format_code(&self) -> char {
        self.format_code
    }

    pub fn byte_size(&self) -> usize {
        self.byte_size
    }

    pub fn value_kind(&self) -> ValueKind {
        self.value_kind
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

pub const BYTE: PrimitiveType = PrimitiveType::new("byte", 's', 1, ValueKind::ByteString);
pub const INT8: PrimitiveType = PrimitiveType::new("int8", 'b', 1, ValueKind::Integer);
pub const UINT8: PrimitiveType = PrimitiveType::new("uint8", 'B', 1, ValueKind::Integer);
pub const INT16: PrimitiveType = PrimitiveType::new("int16", 'h', 2, ValueKind::Integer);
pub const UINT16: PrimitiveType = PrimitiveType::new("uint16", 'H', 2, ValueKind::Integer);
pub const INT32: PrimitiveType = PrimitiveType::new("int32", 'i', 4, ValueKind::Integer);
pub const UINT32: PrimitiveType = PrimitiveType::new("uint32", 'I', 4, ValueKind::Integer);
pub const INT64: PrimitiveType = PrimitiveType::new("int64", 'q', 8, ValueKind::Integer);
pub const UINT64: PrimitiveType = PrimitiveType::new("uint64", 'Q', 8, ValueKind::Integer);
pub const FLOAT16: PrimitiveType = PrimitiveType::new("float16", 'e', 2, ValueKind::Float);
pub const FLOAT32: PrimitiveType = PrimitiveType::new("float32", 'f', 4, ValueKind::Float);
pub const FLOAT64: PrimitiveType = PrimitiveType::new("float64", 'd', 8, ValueKind::Float);

/// Alias of [`FLOAT64`].
pub const DOUBLE: PrimitiveType = FLOAT64;
/// Alias of [`BYTE`].
pub const CHAR: PrimitiveType = BYTE;

const CANONICAL: [PrimitiveType; 12] = [
    BYTE, INT8, UINT8, INT16, UINT16, INT32, UINT32, INT64, UINT64, FLOAT16, FLOAT32, FLOAT64,
];

const ALIASES: [(&str, PrimitiveType); 2] = [("double", DOUBLE), ("char", CHAR)];

/// Look up a primitive by name; aliases (`double`, `char`) included.
pub fn lookup(name: &str) -> Option<PrimitiveType> {
    CANONICAL
        .iter()
        .copied()
        .find(|p| p.name == name)
        .or_else(|| ALIASES.iter().find(|(alias, _)| *alias == name).map(|(_, p)| *p))
}

/// All canonical primitives, in registry order.
pub fn all() -> impl Iterator<Item = PrimitiveType> {
    CANONICAL.into_iter()
}

/// True if `name` is reserved by the registry (canonical name or alias).
pub fn is_reserved(name: &str) -> bool {
    lookup(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_canonical_names() {
        assert_eq!(lookup("int32"), Some(INT32));
        assert_eq!(lookup("float32").map(|p| p.format_code()), Some('f'));
        assert_eq!(lookup("uint64").map(|p| p.byte_size()), Some(8));
        assert_eq!(lookup("nope"), None);
    }

    #[test]
    fn aliases_resolve_to_canonical() {
        assert_eq!(lookup("double"), Some(FLOAT64));
        assert_eq!(lookup("char"), Some(BYTE));
        assert_eq!(lookup("char").map(|p| p.name()), Some("byte"));
    }

    #[test]
    fn format_codes_are_unique() {
        let mut codes: Vec<char> = all().map(|p| p.format_code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 12);
    }

    #[test]
    fn value_kinds() {
        assert_eq!(INT32.value_kind(), ValueKind::Integer);
        assert_eq!(FLOAT16.value_kind(), ValueKind::Float);
        assert_eq!(BYTE.value_kind(), ValueKind::ByteString);
    }
}
