//! fax-util - shared foundation types used by every stage of the pipeline.
//!
//! Lexer, parser, interpreter, and code generator all need the same small
//! set of cross-cutting concerns: interned identifiers, source positions,
//! and a single error taxonomy that can be rendered consistently at the
//! top level. Keeping those here means none of the later crates reinvent
//! them, and a diagnostic produced in the lexer looks the same as one
//! produced in the interpreter.

mod diagnostic;
mod error;
mod span;
mod symbol;

pub use diagnostic::{Diagnostic, Level};
pub use error::{ErrorKind, FaxError};
pub use span::Span;
pub use symbol::{Interner, Symbol};
