//! Check errors
//!
//! Every error here is a caller mistake or a malformed subject and is
//! raised before any reflection happens. Mismatches are not errors; they are reported.

use thiserror::Error;

/// Result type for check operations
pub type CheckResult<T> = Result<T, CheckError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    /// `only` given an empty column list
    #[error("empty only list")]
    EmptyOnlyList,

    /// `except` given an empty column list
    #[error("empty except list")]
    EmptyExceptList,

    /// `only` and `except` are mutually exclusive
    #[error("cannot use only and except")]
    OnlyAndExcept,

    /// The subject is not a table-backed model
    #[error("{subject} does not map to a database table")]
    TypeMismatch { subject: String },

    /// Two columns of the subject share a name
    #[error("{model} declares column '{column}' more than once")]
    DuplicateColumn { model: String, column: String },
}

impl CheckError {
    pub fn code(&self) -> &'static str {
        match self {
            CheckError::EmptyOnlyList | CheckError::EmptyExceptList | CheckError::OnlyAndExcept => {
                "SE_USAGE_ERROR"
            }
            CheckError::TypeMismatch { .. } => "SE_TYPE_MISMATCH",
            CheckError::DuplicateColumn { .. } => "SE_DUPLICATE_COLUMN",
        }
    }

    /// Misuse of the options rather than of the subject
    pub fn is_usage_error(&self) -> bool {
        !matches!(
            self,
            CheckError::TypeMismatch { .. } | CheckError::DuplicateColumn { .. }
        )
    }
}
