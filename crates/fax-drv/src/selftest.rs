//! The `--test` entrypoint (§4.9, §6.2): a small embedded regression
//! suite run directly against the interpreter, independent of any file
//! on disk. Mirrors the reference driver's `TESTS::run_all_unittests`
//! in spirit (a one-shot internal smoke test a packager can run after
//! installing the binary) without depending on a particular unit-test
//! framework being present at runtime.

use std::path::Path;

use fax_interp::{run_program, Value};

struct Case {
    name: &'static str,
    source: &'static str,
    expect: fn(&Value) -> bool,
}

const CASES: &[Case] = &[
    Case {
        name: "hello returns zero",
        source: r#"function main() print("hello"); return 0; .."#,
        expect: |v| matches!(v, Value::Int(0)),
    },
    Case {
        name: "arithmetic precedence",
        source: "function main() return 1 + 2 * 3; ..",
        expect: |v| matches!(v, Value::Int(7)),
    },
    Case {
        name: "int/float promotion",
        source: "function main() return 1 + 2.0; ..",
        expect: |v| matches!(v, Value::Float(f) if (*f - 3.0).abs() < f64::EPSILON),
    },
    Case {
        name: "while loop with compound assignment",
        source: "function main() let i = 0; while i < 10 i += 1; .. return i; ..",
        expect: |v| matches!(v, Value::Int(10)),
    },
];

/// Runs every embedded case, printing a PASS/FAIL line for each, and
/// returns `true` iff all of them passed.
pub fn run_all() -> bool {
    let mut all_passed = true;
    for case in CASES {
        let result = run_program(case.source, Path::new("."), Vec::new());
        let passed = matches!(&result, Ok(v) if (case.expect)(v));
        println!("[{}] {}", if passed { "PASS" } else { "FAIL" }, case.name);
        if !passed {
            if let Err(e) = &result {
                eprintln!("  {}", e.render());
            }
            all_passed = false;
        }
    }
    all_passed
}
