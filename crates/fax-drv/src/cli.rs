//! Argument surface (§4.9/§6.2): a flat set of mode flags rather than
//! subcommands, matching the single-binary `--flag` convention the
//! language's own reference driver uses.

use std::path::PathBuf;

use clap::Parser;

use crate::error::{DriverError, Result};

#[derive(Parser, Debug)]
#[command(name = "fax")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Lex, parse, interpret, or compile a fax source file")]
pub struct Cli {
    /// Run the internal self-check suite and exit.
    #[arg(long)]
    pub test: bool,

    /// Lex `--input` and stop.
    #[arg(long)]
    pub lex: bool,

    /// Lex and parse `--input` and stop.
    #[arg(long)]
    pub parse: bool,

    /// Lex, parse, and interpret `--input`.
    #[arg(long)]
    pub exec: bool,

    /// Lex, parse, and emit generated C for `--input` to stdout.
    #[arg(long)]
    pub comp: bool,

    /// Lex, parse, generate C, and link a binary at `--output`.
    #[arg(long = "comp-e2e")]
    pub comp_e2e: bool,

    /// For `--lex`/`--parse`, print the JSON dump (§6.3) instead of nothing.
    #[arg(long = "dump-json")]
    pub dump_json: bool,

    /// Source file. Required by every mode except `--test`.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Output binary path. Required by `--comp-e2e`.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Space-split program argv, passed to `main` under `--exec`.
    #[arg(long)]
    pub argv: Option<String>,
}

/// The single mode a parsed [`Cli`] resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Test,
    Lex,
    Parse,
    Exec,
    Comp,
    CompE2e,
}

impl Cli {
    /// Resolves the flag set to exactly one [`Mode`], or a usage error
    /// if zero or more than one mode flag was given, or a required
    /// companion flag (`--input`, `--output`) is missing for the mode
    /// selected.
    pub fn mode(&self) -> Result<Mode> {
        let selected: Vec<Mode> = [
            (self.test, Mode::Test),
            (self.lex, Mode::Lex),
            (self.parse, Mode::Parse),
            (self.exec, Mode::Exec),
            (self.comp, Mode::Comp),
            (self.comp_e2e, Mode::CompE2e),
        ]
        .into_iter()
        .filter_map(|(flag, mode)| flag.then_some(mode))
        .collect();

        let mode = match selected.as_slice() {
            [] => {
                return Err(DriverError::Usage(
                    "no mode flag given (expected one of --test, --lex, --parse, --exec, --comp, --comp-e2e)".to_string(),
                ))
            }
            [mode] => *mode,
            _ => {
                return Err(DriverError::Usage(
                    "more than one mode flag given; exactly one is required".to_string(),
                ))
            }
        };

        if mode != Mode::Test && self.input.is_none() {
            return Err(DriverError::Usage(format!(
                "--input is required for {mode:?}"
            )));
        }
        if mode == Mode::CompE2e && self.output.is_none() {
            return Err(DriverError::Usage(
                "--output is required for --comp-e2e".to_string(),
            ));
        }
        Ok(mode)
    }

    /// Splits `--argv` on ASCII whitespace, matching the reference
    /// driver's `split_argv`. Absent `--argv` yields an empty argv.
    pub fn program_argv(&self) -> Vec<String> {
        match &self.argv {
            Some(s) if !s.is_empty() => s.split_whitespace().map(str::to_string).collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut full = vec!["fax"];
        full.extend_from_slice(args);
        Cli::parse_from(full)
    }

    #[test]
    fn test_mode_needs_no_input() {
        let cli = parse(&["--test"]);
        assert_eq!(cli.mode().unwrap(), Mode::Test);
    }

    #[test]
    fn exec_without_input_is_a_usage_error() {
        let cli = parse(&["--exec"]);
        assert!(cli.mode().is_err());
    }

    #[test]
    fn no_mode_flag_is_a_usage_error() {
        let cli = parse(&["--input", "a.fax"]);
        assert!(cli.mode().is_err());
    }

    #[test]
    fn two_mode_flags_is_a_usage_error() {
        let cli = parse(&["--lex", "--parse", "--input", "a.fax"]);
        assert!(cli.mode().is_err());
    }

    #[test]
    fn comp_e2e_requires_output() {
        let cli = parse(&["--comp-e2e", "--input", "a.fax"]);
        assert!(cli.mode().is_err());
        let cli = parse(&["--comp-e2e", "--input", "a.fax", "--output", "a.out"]);
        assert_eq!(cli.mode().unwrap(), Mode::CompE2e);
    }

    #[test]
    fn argv_splits_on_whitespace() {
        let cli = parse(&["--exec", "--input", "a.fax", "--argv", "one two  three"]);
        assert_eq!(cli.program_argv(), vec!["one", "two", "three"]);
    }

    #[test]
    fn absent_argv_is_empty() {
        let cli = parse(&["--exec", "--input", "a.fax"]);
        assert!(cli.program_argv().is_empty());
    }
}
