//! fax-runtime - the C runtime library the code generator's output
//! links against (§4.8). The library has no prebuilt binary: its
//! source is carried as embedded text and materialized to a working
//! directory immediately before `cc` is invoked, so the end-to-end
//! `--comp-e2e` pipeline never depends on anything outside the crate
//! itself.

use std::io;
use std::path::{Path, PathBuf};

/// Header consumed by generated C and by `runtime.c` itself.
pub const RUNTIME_HEADER: &str = include_str!("../c/runtime.h");
/// Implementation of the runtime ABI (§4.7/§4.8).
pub const RUNTIME_SOURCE: &str = include_str!("../c/runtime.c");

pub const RUNTIME_HEADER_FILENAME: &str = "runtime.h";
pub const RUNTIME_SOURCE_FILENAME: &str = "runtime.c";

/// Writes `runtime.h` and `runtime.c` into `dir`, returning their
/// paths. `dir` must already exist; this never creates directories of
/// its own, leaving working-directory lifetime to the caller (the
/// driver owns the temporary directory for `--comp-e2e`).
pub fn materialize(dir: &Path) -> io::Result<(PathBuf, PathBuf)> {
    let header_path = dir.join(RUNTIME_HEADER_FILENAME);
    let source_path = dir.join(RUNTIME_SOURCE_FILENAME);
    std::fs::write(&header_path, RUNTIME_HEADER)?;
    std::fs::write(&source_path, RUNTIME_SOURCE)?;
    Ok((header_path, source_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn materialize_writes_both_files_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let (header, source) = materialize(dir.path()).unwrap();
        assert_eq!(std::fs::read_to_string(&header).unwrap(), RUNTIME_HEADER);
        assert_eq!(std::fs::read_to_string(&source).unwrap(), RUNTIME_SOURCE);
    }

    #[test]
    fn embedded_header_declares_the_full_abi() {
        for symbol in [
            "make_int", "make_float", "make_bool", "make_string", "make_vector_known_size",
            "make_dict", "make_nothing", "op_add", "op_eq", "op_and", "op_umin", "op_unot",
            "get_index", "set_index", "field_access", "dynamic_function_call", "builtin_print",
            "get_conditional_result", "make_argv",
        ] {
            assert!(
                RUNTIME_HEADER.contains(symbol),
                "runtime.h is missing declaration for {symbol}"
            );
        }
    }
}
