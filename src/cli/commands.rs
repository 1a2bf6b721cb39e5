//! CLI command implementations
//!
//! `check` loads every descriptor from the model directory, runs the selected
//! checks and prints one result per model and check. Any failed check turns
//! into a `CheckFailed` error so the process exits non-zero.

use std::io::{self, Write};

use serde::Serialize;

use crate::check::{CheckOptions, Mismatch, NullabilityCheck, UniquenessCheck};
use crate::model::{Model, ModelDefinition, ModelLoader};

use super::args::{CheckArgs, Command};
use super::errors::{CliError, CliResult};
use super::io::{write_json_line, write_text_line};

/// One check run against one model
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub model: String,
    pub check: &'static str,
    pub passed: bool,
    pub explanation: String,
    pub mismatches: Vec<Mismatch>,
}

impl CheckOutcome {
    /// `PASS Record nullability` / `FAIL Record uniqueness: <explanation>`
    pub fn summary(&self) -> String {
        if self.passed {
            format!("PASS {} {}", self.model, self.check)
        } else {
            format!("FAIL {} {}: {}", self.model, self.check, self.explanation)
        }
    }
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Check(args) => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            check(&args, &mut out)
        }
    }
}

/// Runs the selected checks and prints their outcomes to `out`.
pub fn check<W: Write>(args: &CheckArgs, out: &mut W) -> CliResult<()> {
    let outcomes = evaluate(args)?;

    for outcome in &outcomes {
        if args.json {
            write_json_line(out, outcome)?;
        } else {
            write_text_line(out, &outcome.summary())?;
        }
    }
    out.flush()?;

    let failures = outcomes.iter().filter(|outcome| !outcome.passed).count();
    if failures > 0 {
        return Err(CliError::check_failed(failures));
    }
    Ok(())
}

/// Loads the descriptors and runs the checks without printing anything.
///
/// Abstract descriptors are skipped unless named explicitly, in which case
/// the check rejects them.
pub fn evaluate(args: &CheckArgs) -> CliResult<Vec<CheckOutcome>> {
    let options = CheckOptions::new(args.only.clone(), args.except.clone())?;

    let mut loader = ModelLoader::new(&args.models);
    loader.load_all()?;

    let models: Vec<&ModelDefinition> = match &args.model {
        Some(name) => vec![loader
            .get(name)
            .ok_or_else(|| CliError::unknown_model(name))?],
        None => loader
            .models()
            .filter(|model| model.table_name().is_some())
            .collect(),
    };

    let mut outcomes = Vec::new();
    for model in models {
        if args.runs_nullability() {
            let report = NullabilityCheck::new(options.clone()).check(model)?;
            let explanation = report.explain();
            outcomes.push(CheckOutcome {
                model: report.model,
                check: "nullability",
                passed: report.matches,
                explanation,
                mismatches: report.mismatches,
            });
        }
        if args.runs_uniqueness() {
            let report = UniquenessCheck::new(options.clone()).check(model)?;
            let explanation = report.explain();
            outcomes.push(CheckOutcome {
                model: report.model,
                check: "uniqueness",
                passed: report.matches,
                explanation,
                mismatches: report.mismatches,
            });
        }
    }

    Ok(outcomes)
}
