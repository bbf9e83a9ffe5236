//! Error type for the driver binary itself.
//!
//! Lex/parse/interpreter/codegen failures already carry their own
//! located rendering (`fax_util::FaxError::render`, §7) and are passed
//! through as-is; this enum exists for the errors that can only happen
//! at the driver layer: bad flag combinations, file I/O, JSON framing,
//! and a failed `cc` invocation.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("{0}")]
    Usage(String),

    #[error("cannot read '{path}': {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A lex/parse/interpret/codegen failure. Carries the already
    /// well-formed `FaxError` rendering rather than re-wrapping it, so
    /// `main` can print it verbatim per §7.
    #[error("{}", .0.render())]
    Lang(#[from] fax_util::FaxError),

    #[error("cc exited with status {0}")]
    CcFailed(i32),

    #[error("cc terminated by signal before producing '{0}'")]
    CcTerminated(PathBuf),
}

pub type Result<T> = std::result::Result<T, DriverError>;
