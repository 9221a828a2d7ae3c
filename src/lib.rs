//! # packlayout — Generic Packed Struct Layouts
//!
//! Declare C-like packed binary record layouts whose element types and array
//! lengths may be left as named parameters, specialize them (fully or
//! partially, including through nested templated fields), and synthesize the
//! canonical packed-format token string of every fully resolved layout.
//!
//! ## Primitive types
//!
//! `int8` `b`, `uint8` `B`, `int16` `h`, `uint16` `H`, `int32` `i`, `uint32` `I`,
//! `int64` `q`, `uint64` `Q`, `float16` `e`, `float32` `f`, `float64` `d`,
//! `byte` `s`; aliases `double` (float64) and `char` (byte).
//!
//! ## Token strings
//!
//! Fields are emitted in declaration order. Arrays of primitives use a count
//! prefix (`float32[10][10]` is `100f`); arrays of structs repeat the nested
//! token (`Inner[2]` with `Inner = if` is `ifif`). Templates have no token.
//!
//! ## Example schema
//!
//! ```text
//! param T, Tx, Ty;
//!
//! struct Templated {
//!   value: T;
//!   samples: float32[Tx];
//! }
//!
//! struct OneArgument {
//!   a: T;
//! }
//!
//! struct Nested {
//!   a: Templated % { T: Ty, Tx: 100 };
//!   b: OneArgument % Ty;
//! }
//!
//! let Concrete = Nested % float32;   // token "f100ff"
//! ```
//!
//! ## Usage
//!
//! ```
//! use packlayout::{Bindings, Field, FieldType, StructDef, TypeParam, primitive};
//!
//! let t = TypeParam::new("T");
//! let tx = TypeParam::new("Tx");
//! let template = StructDef::define(
//!     "Complex",
//!     vec![
//!         Field::new("a", FieldType::new(t.clone()).dim(tx.clone())?),
//!         Field::new("b", FieldType::new(t).dim(10u64)?),
//!         Field::new("c", FieldType::new(primitive::INT32).dim(tx)?),
//!     ],
//! )?;
//! assert_eq!(template.token_string(), None);
//!
//! let spec = template.specialize(Bindings::new().bind("T", primitive::INT32).bind("Tx", 2u64))?;
//! assert_eq!(spec.token_string(), Some("2i10i2i"));
//! # Ok::<(), packlayout::LayoutError>(())
//! ```

pub mod ast;
pub mod dump;
pub mod error;
pub mod parser;
pub mod primitive;
pub mod schema;
mod specialize;
pub mod template;
mod token;

pub use ast::{Arg, ArrayDim, Bindings, Field, FieldType, TypeExpr, TypeParam};
pub use error::{ErrorKind, LayoutError};
pub use parser::{parse, ParseError};
pub use primitive::PrimitiveType;
pub use schema::Schema;
pub use template::StructDef;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber for debug output.
///
/// Only takes effect when `RUST_LOG` is set (e.g. `RUST_LOG=packlayout=debug`).
/// Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
