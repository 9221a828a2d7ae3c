//! Errors raised while declaring and specializing struct layouts.

/// Which class of failure a [`LayoutError`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A value of the wrong kind was supplied (bad binding key, non-integer length, ...).
    Binding,
    /// A partially specialized template was used where a concrete type is required.
    Incomplete,
    /// A resolved layout is too large to represent (token length or packed size).
    Overflow,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("{template}: no such parameter `{param}`")]
    UnknownParameter { template: String, param: String },
    #[error("{template}: a bare argument needs exactly one free parameter (found {free})")]
    BareBindingArity { template: String, free: usize },
    #[error("{template}: array length `{param}` must be an integer, got `{found}`")]
    LengthNotInteger {
        template: String,
        param: String,
        found: String,
    },
    #[error("{template}: array length `{param}` must be positive")]
    ZeroLength { template: String, param: String },
    #[error("{template}: parameter `{param}` is an element type, got integer {found}")]
    TypeExpected {
        template: String,
        param: String,
        found: u64,
    },
    #[error("invalid array dimension `{0}`: expected a positive integer or a parameter")]
    InvalidDimension(String),
    #[error("{template}: duplicate field `{field}`")]
    DuplicateField { template: String, field: String },
    #[error("`{0}` is not a struct template and cannot be specialized")]
    NotSpecializable(String),
    #[error("{template}: unspecified template `{nested}` used where a concrete type is required (unbound: {})", .unbound.join(", "))]
    IncompleteSpecialization {
        template: String,
        nested: String,
        unbound: Vec<String>,
    },
    #[error("{template}: {what} is too large")]
    TooLarge { template: String, what: &'static str },
}

impl LayoutError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LayoutError::IncompleteSpecialization { .. } => ErrorKind::Incomplete,
            LayoutError::TooLarge { .. } => ErrorKind::Overflow,
            _ => ErrorKind::Binding,
        }
    }
}
