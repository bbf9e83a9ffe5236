use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single source position: 1-based line and column, as the lexer counts
/// them while scanning. Tokens and AST nodes carry a `Span` so that any
/// later-stage error can point back at the exact place the offending
/// construct began.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Span {
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Placeholder span for synthesized nodes that have no source origin
    /// (e.g. the implicit `return make_nothing();` the code generator
    /// appends to a function body).
    pub const DUMMY: Span = Span { line: 0, column: 0 };
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}
