//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero status.

use std::fmt;
use std::io;

use crate::check::CheckError;
use crate::model::ModelError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Bad flags or an unknown model
    UsageError,
    /// Descriptors could not be loaded or do not describe a checkable model
    ModelError,
    /// I/O error (stdout)
    IoError,
    /// At least one check reported mismatches
    CheckFailed,
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UsageError => "SE_CLI_USAGE_ERROR",
            Self::ModelError => "SE_CLI_MODEL_ERROR",
            Self::IoError => "SE_CLI_IO_ERROR",
            Self::CheckFailed => "SE_CLI_CHECK_FAILED",
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn usage_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::UsageError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn unknown_model(name: &str) -> Self {
        Self::usage_error(format!("unknown model '{}'", name))
    }

    pub fn check_failed(failures: usize) -> Self {
        let noun = if failures == 1 { "check" } else { "checks" };
        Self::new(
            CliErrorCode::CheckFailed,
            format!("{} {} failed", failures, noun),
        )
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ModelError> for CliError {
    fn from(e: ModelError) -> Self {
        Self::new(CliErrorCode::ModelError, format!("{} ({})", e, e.code()))
    }
}

impl From<CheckError> for CliError {
    fn from(e: CheckError) -> Self {
        let code = if e.is_usage_error() {
            CliErrorCode::UsageError
        } else {
            CliErrorCode::ModelError
        };
        Self::new(code, format!("{} ({})", e, e.code()))
    }
}

pub type CliResult<T> = Result<T, CliError>;
