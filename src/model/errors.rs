//! Model errors
//!
//! - `ProbeError`: a default-expression probe failed (recovered, logged)
//! - `ModelError`: a model descriptor could not be loaded

use thiserror::Error;

/// Result type for model descriptor operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Failure to evaluate a server-side default expression.
///
/// Never fatal: the caller logs it and treats the column as having no
/// present default.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("default expression `{expression}` could not be evaluated: {message}")]
pub struct ProbeError {
    expression: String,
    message: String,
}

impl ProbeError {
    pub fn new(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            message: message.into(),
        }
    }

    /// The host has no channel to run probes
    pub fn unsupported(expression: impl Into<String>) -> Self {
        Self::new(expression, "model has no query channel for default probes")
    }

    pub fn code(&self) -> &'static str {
        "SE_PROBE_FAILED"
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Model descriptor errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// Reading a descriptor file or directory failed
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Descriptor is not valid JSON or misses required fields
    #[error("Malformed model descriptor '{path}': {reason}")]
    Malformed { path: String, reason: String },

    /// The value handed over does not describe a table-backed model
    #[error("{subject} does not describe a table-backed model")]
    TypeMismatch { subject: String },

    /// Two columns share a name
    #[error("Model '{model}' declares column '{column}' more than once")]
    DuplicateColumn { model: String, column: String },

    /// Two descriptors share a model name
    #[error("Model '{0}' is defined more than once")]
    DuplicateModel(String),
}

impl ModelError {
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::Io { .. } => "SE_MODEL_IO",
            ModelError::Malformed { .. } => "SE_MODEL_MALFORMED",
            ModelError::TypeMismatch { .. } => "SE_TYPE_MISMATCH",
            ModelError::DuplicateColumn { .. } => "SE_MODEL_DUPLICATE_COLUMN",
            ModelError::DuplicateModel(_) => "SE_MODEL_DUPLICATE",
        }
    }
}
