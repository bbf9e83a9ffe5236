use crate::{FaxError, Span};
use std::fmt;

/// Severity for a rendered diagnostic. The interpreter and parser only
/// ever emit `Error` (§7: no recovery, no warnings survive to the CLI
/// surface), but keeping the enum lets driver-level tooling (e.g.
/// `--dump-json`) attach a severity without threading a bool around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Note => "note",
        };
        write!(f, "{s}")
    }
}

/// A diagnostic ready to print. `Diagnostic::from` converts any
/// [`FaxError`] (the actual error type the pipeline propagates) into
/// this display-oriented shape.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub level: Level,
    pub span: Span,
    pub message: String,
}

impl Diagnostic {
    pub fn error(span: Span, message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            span,
            message: message.into(),
        }
    }
}

impl From<&FaxError> for Diagnostic {
    fn from(err: &FaxError) -> Self {
        Diagnostic::error(err.span, err.render())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.level, self.message)
    }
}
