//! fax-gen - lowers a parsed program into a single C translation unit
//! against the `fax-runtime` ABI (§4.7).

mod emit;
mod symtab;

use std::path::Path;

use fax_par::{Node, NodeData, NodeKind};
use fax_util::FaxError;

use emit::Codegen;
use symtab::{Entry, EntryKind, Table};

/// Generates the complete C source for `top`, inlining every import
/// transitively reachable from it. `base_dir` is the directory
/// `top`'s own relative import paths are resolved against.
pub fn generate(top: &Node, base_dir: &Path) -> Result<String, FaxError> {
    require_main(top)?;
    let mut codegen = Codegen::new();
    let root = Table::new_root();
    install_builtins(&root);
    codegen.emit_top_level(top, &root, base_dir, "")?;
    Ok(codegen.finish())
}

/// Registers the always-available global `print` (§4.6) in the
/// compile-time table so an unqualified call resolves to a direct C
/// call against the runtime library, mirroring the interpreter's own
/// `install_builtins`.
fn install_builtins(root: &symtab::TableRef) {
    root.borrow_mut()
        .declare(
            "print",
            Entry {
                kind: EntryKind::Builtin,
                c_name: "builtin_print".to_string(),
                module_table: None,
            },
            fax_util::Span::DUMMY,
        )
        .expect("root scope is empty at startup");
}

fn require_main(top: &Node) -> Result<(), FaxError> {
    let has_main = top.children.iter().any(|decl| {
        decl.kind == NodeKind::FuncDeclare
            && matches!(&decl.data, NodeData::FuncDecl { name, .. } if name == "main")
    });
    if has_main {
        Ok(())
    } else {
        Err(FaxError::resolution(top.span, "program has no 'main' function"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gen(src: &str) -> String {
        let top = fax_par::parse_source(src).unwrap();
        generate(&top, Path::new(".")).unwrap()
    }

    #[test]
    fn hello_world_emits_print_call() {
        let c = gen(r#"function main() print("hello"); .."#);
        assert!(c.contains("RuntimeObject* L528_main(RuntimeObject* arg0)"));
        assert!(c.contains(r#"builtin_print(make_string("hello"))"#));
        assert!(c.contains("L528_main(program_argv)"));
    }

    #[test]
    fn arithmetic_uses_runtime_ops() {
        let c = gen("function main() let x = 1 + 2 * 3; print(x); ..");
        assert!(c.contains("op_mul(make_int(2LL), make_int(3LL))"));
        assert!(c.contains("op_add(make_int(1LL),"));
    }

    #[test]
    fn while_loop_emits_labels_and_goto() {
        let c = gen("function main() let i = 0; while i < 3 i += 1; .. ..");
        assert!(c.contains("goto L528LAB"));
        assert!(c.contains("op_lt("));
        assert!(c.contains("op_add(local0, make_int(1LL))"));
    }

    #[test]
    fn vector_literal_uses_set_index() {
        let c = gen("function main() let v = [1, 2, 3]; ..");
        assert!(c.contains("make_vector_known_size(3)"));
        assert!(c.contains("set_index("));
    }

    #[test]
    fn method_call_prepends_receiver() {
        let c = gen(r#"function main() let v = [1, 2]; print(v.length()); .."#);
        assert!(c.contains("field_access(local0,"));
        assert!(c.contains("dynamic_function_call"));
    }

    #[test]
    fn direct_function_call_is_a_named_c_call() {
        let c = gen("function square(n) return n * n; .. function main() print(square(4)); ..");
        assert!(c.contains("L528_square(make_int(4LL))"));
    }

    #[test]
    fn imported_function_resolves_to_direct_call_when_statically_known() {
        let dir = tempfile::tempdir().unwrap();
        let lib_path = dir.path().join("lib.lang");
        std::fs::write(&lib_path, "function double(n) return n * 2; ..").unwrap();
        let main_src = r#"import "lib.lang" as lib; function main() print(lib.double(21)); .."#;
        let top = fax_par::parse_source(main_src).unwrap();
        let c = generate(&top, dir.path()).unwrap();
        assert!(c.contains("L528_lib_double"));
        assert!(c.contains("L528_lib_double(make_int(21LL))"));
    }

    #[test]
    fn unaliased_import_resolves_unqualified_calls_directly() {
        let dir = tempfile::tempdir().unwrap();
        let lib_path = dir.path().join("lib.lang");
        std::fs::write(&lib_path, "function double(n) return n * 2; .. function main() return 0; ..").unwrap();
        let main_src = r#"import "lib.lang"; function main() print(double(21)); .."#;
        let top = fax_par::parse_source(main_src).unwrap();
        let c = generate(&top, dir.path()).unwrap();
        assert!(c.contains("L528_lib_double(make_int(21LL))"));
    }

    #[test]
    fn missing_main_is_a_resolution_error() {
        let top = fax_par::parse_source("function helper() return 1; ..").unwrap();
        let err = generate(&top, Path::new(".")).unwrap_err();
        assert_eq!(err.kind, fax_util::ErrorKind::Resolution);
    }
}
