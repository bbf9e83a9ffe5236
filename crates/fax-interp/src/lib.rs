//! fax-interp - the tree-walking evaluator (§4.3-§4.6) that executes a
//! parsed program directly against its AST, without lowering to any
//! intermediate form. This is the reference semantics the C backend
//! (`fax-gen` + `fax-runtime`) is required to reproduce byte-for-byte.

mod builtins;
mod interpreter;
mod ops;
mod symtab;
mod value;

pub use interpreter::{call_function, eval_top_level, run_program};
pub use symtab::{EntryKind, SymbolTable, TableRef};
pub use value::{stringify, Builtin, DictData, FunctionValue, ModuleValue, Value};

#[cfg(test)]
mod tests {
    use super::*;
    use fax_util::ErrorKind;
    use std::io::Write;
    use std::path::Path;

    fn run(source: &str) -> Result<Value, fax_util::FaxError> {
        run_program(source, Path::new("."), Vec::new())
    }

    #[test]
    fn hello_program_runs_main_and_prints() {
        let src = r#"
            function main() print("hello"); return 0; ..
        "#;
        let result = run(src).unwrap();
        assert!(matches!(result, Value::Int(0)));
    }

    #[test]
    fn int_arithmetic_stays_int_without_float_operands() {
        let src = r#"
            function main()
                let x = 2 + 3 * 4;
                return x;
            ..
        "#;
        assert!(matches!(run(src).unwrap(), Value::Int(14)));
    }

    #[test]
    fn mixing_int_and_float_promotes_to_float() {
        let src = r#"
            function main()
                return 1 + 2.0;
            ..
        "#;
        assert!(matches!(run(src).unwrap(), Value::Float(f) if f == 3.0));
    }

    #[test]
    fn modulo_rejects_mixed_int_and_float() {
        let src = r#"
            function main()
                return 1 % 2.0;
            ..
        "#;
        let err = run(src).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Type);
    }

    #[test]
    fn float_prints_with_one_decimal_digit() {
        assert_eq!(stringify(&Value::Float(3.0)), "3.0");
        assert_eq!(stringify(&Value::Float(3.14159)), "3.1");
    }

    #[test]
    fn while_loop_with_compound_assign_accumulates() {
        let src = r#"
            function main()
                let i = 0;
                let total = 0;
                while i < 5
                    total += i;
                    i += 1;
                ..
                return total;
            ..
        "#;
        assert!(matches!(run(src).unwrap(), Value::Int(10)));
    }

    #[test]
    fn vector_method_dispatch_mutates_in_place() {
        let src = r#"
            function main()
                let v = [1, 2];
                v.append(3);
                return v.length();
            ..
        "#;
        assert!(matches!(run(src).unwrap(), Value::Int(3)));
    }

    #[test]
    fn dict_supports_mixed_type_keys() {
        let src = r#"
            function main()
                let d = {"a": 1, 2: "b"};
                return d.length();
            ..
        "#;
        assert!(matches!(run(src).unwrap(), Value::Int(2)));
    }

    #[test]
    fn dict_int_and_string_keys_do_not_collide() {
        let src = r#"
            function main()
                let d = {"1": "string-key", 1: "int-key"};
                return d.length();
            ..
        "#;
        assert!(matches!(run(src).unwrap(), Value::Int(2)));
    }

    #[test]
    fn import_with_alias_exposes_module_functions() {
        let dir = tempfile::tempdir().unwrap();
        let lib_path = dir.path().join("lib.lang");
        std::fs::File::create(&lib_path)
            .unwrap()
            .write_all(b"function double(x) return x * 2; ..")
            .unwrap();

        let main_path = dir.path().join("main.lang");
        let src = r#"
            import "lib.lang" as m;
            function main()
                return m.double(21);
            ..
        "#;
        std::fs::File::create(&main_path).unwrap().write_all(src.as_bytes()).unwrap();

        let result = run_program(src, dir.path(), Vec::new()).unwrap();
        assert!(matches!(result, Value::Int(42)));
    }

    #[test]
    fn import_without_alias_merges_entries_into_importer_scope() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::File::create(dir.path().join("helpers.lang"))
            .unwrap()
            .write_all(b"const answer = 42; function main() return 0; ..")
            .unwrap();

        let src = r#"
            import "helpers.lang";
            function main()
                return answer;
            ..
        "#;
        let result = run_program(src, dir.path(), Vec::new()).unwrap();
        assert!(matches!(result, Value::Int(42)));
    }

    #[test]
    fn import_without_alias_does_not_merge_the_imported_main() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::File::create(dir.path().join("helpers.lang"))
            .unwrap()
            .write_all(b"function main() return 999; ..")
            .unwrap();

        let src = r#"
            import "helpers.lang";
            function main()
                return 1;
            ..
        "#;
        let result = run_program(src, dir.path(), Vec::new()).unwrap();
        assert!(matches!(result, Value::Int(1)));
    }

    #[test]
    fn redeclaring_a_name_in_the_same_scope_is_a_resolution_error() {
        let src = r#"
            function main()
                let x = 1;
                let x = 2;
                return x;
            ..
        "#;
        let err = run(src).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Resolution);
    }

    #[test]
    fn assigning_to_a_const_is_a_resolution_error() {
        let src = r#"
            function main()
                const x = 1;
                x = 2;
                return x;
            ..
        "#;
        let err = run(src).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Resolution);
    }

    #[test]
    fn field_access_is_not_a_legal_assignment_target() {
        let src = r#"
            function main()
                let d = {"a": 1};
                d.missing = 2;
                return 0;
            ..
        "#;
        let err = run(src).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Type);
    }

    #[test]
    fn condition_must_be_bool_not_truthy_coerced() {
        let src = r#"
            function main()
                if 1 print("unreachable"); ..
                return 0;
            ..
        "#;
        let err = run(src).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Type);
    }

    #[test]
    fn return_inside_while_inside_if_unwinds_to_caller() {
        let src = r#"
            function find_first_even(v)
                let i = 0;
                while i < v.length()
                    if v[i] % 2 == 0
                        return v[i];
                    ..
                    i += 1;
                ..
                return -1;
            ..
            function main()
                return find_first_even([1, 3, 4, 5]);
            ..
        "#;
        assert!(matches!(run(src).unwrap(), Value::Int(4)));
    }

    #[test]
    fn division_by_zero_is_a_type_error() {
        let src = r#"
            function main()
                return 1 / 0;
            ..
        "#;
        let err = run(src).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Type);
    }

    #[test]
    fn vector_index_out_of_range_is_a_bounds_error() {
        let src = r#"
            function main()
                let v = [1, 2];
                return v[5];
            ..
        "#;
        let err = run(src).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Bounds);
    }

    #[test]
    fn elseif_chain_picks_the_matching_branch() {
        let src = r#"
            function classify(n)
                if n < 0
                    return "negative";
                elseif n == 0
                    return "zero";
                else
                    return "positive";
                ..
            ..
            function main()
                return classify(0);
            ..
        "#;
        assert!(matches!(run(src).unwrap(), Value::Str(s) if &*s == "zero"));
    }
}
