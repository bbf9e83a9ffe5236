//! fax-drv - the ambient, in-house driver binary (§4.9) that ties the
//! lexer, parser, interpreter, and C code generator together behind a
//! single `--flag`-based CLI (§6.2).

pub mod cli;
pub mod error;
mod selftest;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use fax_interp::Value;

use cli::{Cli, Mode};
use error::{DriverError, Result};

/// Runs the mode `cli` resolves to, returning the process exit code.
pub fn run(cli: &Cli) -> Result<i32> {
    match cli.mode()? {
        Mode::Test => Ok(if selftest::run_all() { 0 } else { 1 }),
        Mode::Lex => run_lex(cli),
        Mode::Parse => run_parse(cli),
        Mode::Exec => run_exec(cli),
        Mode::Comp => run_comp(cli),
        Mode::CompE2e => run_comp_e2e(cli),
    }
}

fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| DriverError::ReadInput {
        path: path.to_path_buf(),
        source,
    })
}

/// The directory source-relative `import` paths resolve against: the
/// parent of `--input`, or `.` when the input has no parent component.
fn base_dir_of(input: &Path) -> PathBuf {
    input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn run_lex(cli: &Cli) -> Result<i32> {
    let input = cli.input.as_ref().expect("mode() validated --input");
    let source = read_input(input)?;
    let tokens = fax_lex::lex(&source)?;
    if cli.dump_json {
        println!("{}", fax_lex::tokens_to_json(&tokens));
    }
    Ok(0)
}

fn run_parse(cli: &Cli) -> Result<i32> {
    let input = cli.input.as_ref().expect("mode() validated --input");
    let source = read_input(input)?;
    let ast = fax_par::parse_source(&source)?;
    if cli.dump_json {
        println!("{}", fax_par::to_json(&ast));
    }
    Ok(0)
}

fn run_exec(cli: &Cli) -> Result<i32> {
    let input = cli.input.as_ref().expect("mode() validated --input");
    let source = read_input(input)?;
    let base_dir = base_dir_of(input);
    let argv = cli
        .program_argv()
        .into_iter()
        .map(Value::new_str)
        .collect();
    fax_interp::run_program(&source, &base_dir, argv)?;
    Ok(0)
}

fn run_comp(cli: &Cli) -> Result<i32> {
    let input = cli.input.as_ref().expect("mode() validated --input");
    let source = read_input(input)?;
    let base_dir = base_dir_of(input);
    let ast = fax_par::parse_source(&source)?;
    let c_source = fax_gen::generate(&ast, &base_dir)?;
    println!("{c_source}");
    Ok(0)
}

fn run_comp_e2e(cli: &Cli) -> Result<i32> {
    let input = cli.input.as_ref().expect("mode() validated --input");
    let output = cli.output.as_ref().expect("mode() validated --output");
    let source = read_input(input)?;
    let base_dir = base_dir_of(input);
    let ast = fax_par::parse_source(&source)?;
    let c_source = fax_gen::generate(&ast, &base_dir)?;

    let work_dir = tempfile::tempdir()?;
    let (_header_path, _runtime_path) = fax_runtime::materialize(work_dir.path())?;
    let main_path = work_dir.path().join("main.c");
    fs::write(&main_path, c_source)?;

    let status = Command::new("cc")
        .arg(&main_path)
        .arg(work_dir.path().join(fax_runtime::RUNTIME_SOURCE_FILENAME))
        .arg("-I")
        .arg(work_dir.path())
        .arg("-o")
        .arg(output)
        .status();

    // Best-effort cleanup regardless of how `cc` exited.
    let cleanup = fs::remove_dir_all(work_dir.path());

    let status = status?;
    cleanup.ok();

    match status.code() {
        Some(0) => Ok(0),
        Some(code) => Err(DriverError::CcFailed(code)),
        None => Err(DriverError::CcTerminated(output.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_dir_of_uses_parent_directory() {
        assert_eq!(base_dir_of(Path::new("/a/b/c.fax")), PathBuf::from("/a/b"));
    }

    #[test]
    fn base_dir_of_bare_filename_is_dot() {
        assert_eq!(base_dir_of(Path::new("c.fax")), PathBuf::from("."));
    }

    #[test]
    fn run_lex_rejects_missing_file() {
        let cli = Cli {
            test: false,
            lex: true,
            parse: false,
            exec: false,
            comp: false,
            comp_e2e: false,
            dump_json: false,
            input: Some(PathBuf::from("/nonexistent/does-not-exist.fax")),
            output: None,
            argv: None,
        };
        assert!(run(&cli).is_err());
    }

    #[test]
    fn run_exec_executes_a_real_program() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.fax");
        fs::write(&path, r#"function main() print("hello"); return 0; .."#).unwrap();
        let cli = Cli {
            test: false,
            lex: false,
            parse: false,
            exec: true,
            comp: false,
            comp_e2e: false,
            dump_json: false,
            input: Some(path),
            output: None,
            argv: None,
        };
        assert_eq!(run(&cli).unwrap(), 0);
    }

    #[test]
    fn run_comp_emits_c_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.fax");
        fs::write(&path, r#"function main() print("hello"); .."#).unwrap();
        let cli = Cli {
            test: false,
            lex: false,
            parse: false,
            exec: false,
            comp: true,
            comp_e2e: false,
            dump_json: false,
            input: Some(path),
            output: None,
            argv: None,
        };
        assert_eq!(run(&cli).unwrap(), 0);
    }
}
