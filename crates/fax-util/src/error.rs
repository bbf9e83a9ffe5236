use crate::Span;
use std::fmt;
use thiserror::Error;

/// The error taxonomy from §7 of the spec. Every stage raises one of
/// these kinds rather than a stage-specific type, so the driver can
/// render any failure the same way regardless of which phase produced
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lex,
    Parse,
    Resolution,
    Type,
    Arity,
    Bounds,
    Import,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Lex => "LexError",
            ErrorKind::Parse => "ParseError",
            ErrorKind::Resolution => "ResolutionError",
            ErrorKind::Type => "TypeError",
            ErrorKind::Arity => "ArityError",
            ErrorKind::Bounds => "BoundsError",
            ErrorKind::Import => "ImportError",
            ErrorKind::Internal => "InternalError",
        };
        write!(f, "{s}")
    }
}

/// A single error carrying its kind, a message, and the source span it
/// originated at (§7: "prints ... at the current evaluator node").
/// `Span::DUMMY` is used for errors raised before any token has been
/// read (e.g. a missing `--input` flag).
#[derive(Debug, Error, Clone)]
#[error("{kind} at {span}: {message}")]
pub struct FaxError {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Span,
}

impl FaxError {
    pub fn new(kind: ErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    pub fn lex(span: Span, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Lex, span, message)
    }

    pub fn parse(span: Span, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, span, message)
    }

    pub fn resolution(span: Span, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Resolution, span, message)
    }

    pub fn type_error(span: Span, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Type, span, message)
    }

    pub fn arity(span: Span, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Arity, span, message)
    }

    pub fn bounds(span: Span, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Bounds, span, message)
    }

    pub fn import(span: Span, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Import, span, message)
    }

    pub fn internal(span: Span, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, span, message)
    }

    /// Rendering used by every top-level catch point (§7): the runtime
    /// error banner the interpreter and parser both print to stderr
    /// before exiting nonzero.
    pub fn render(&self) -> String {
        format!(
            "Runtime error encountered at line {}, column {}: {}",
            self.span.line, self.span.column, self.message
        )
    }
}
