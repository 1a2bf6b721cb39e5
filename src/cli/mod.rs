//! CLI module for schema-expectations
//!
//! Provides command-line interface for:
//! - check: Run the nullability and uniqueness checks over JSON model
//!   descriptors

mod args;
mod commands;
mod errors;
mod io;

pub use args::{CheckArgs, Cli, Command};
pub use commands::{check, evaluate, run, run_command, CheckOutcome};
pub use errors::{CliError, CliErrorCode, CliResult};
