//! Check outcomes
//!
//! A mismatch is the expected negative result of a check. Each one renders
//! as `"<name> <reason>"`; a report's explanation joins them with `", "`.

use serde::Serialize;
use std::fmt;

use crate::model::Conditions;
use crate::reflect::UniqueScope;

/// Why a column or scope is inconsistent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "conditions")]
pub enum MismatchReason {
    /// Presence validated but the column is nullable
    MissingNotNull,
    /// NOT NULL, but the only presence validators are conditional
    ConditionalPresence(Conditions),
    /// NOT NULL with no presence validator at all
    MissingPresence,
    /// Uniqueness validated but no unique index backs it
    MissingUniqueIndex,
    /// Unique index, but the only uniqueness validators are conditional
    ConditionalUniqueness(Conditions),
    /// Unique index with no uniqueness validator at all
    MissingUniqueness,
}

impl fmt::Display for MismatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MismatchReason::MissingNotNull => {
                write!(f, "has unconditional presence validation but is missing NOT NULL")
            }
            MismatchReason::ConditionalPresence(conditions) => write!(
                f,
                "is NOT NULL but its presence validator was conditional: {}",
                conditions
            ),
            MismatchReason::MissingPresence => write!(f, "is NOT NULL but has no presence validation"),
            MismatchReason::MissingUniqueIndex => write!(
                f,
                "has unconditional uniqueness validation but is missing a unique database index"
            ),
            MismatchReason::ConditionalUniqueness(conditions) => write!(
                f,
                "has a unique index but its uniqueness validator was conditional: {}",
                conditions
            ),
            MismatchReason::MissingUniqueness => {
                write!(f, "has a unique index but no uniqueness validation")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    /// Column name, or `<Model> scope [a, b]`
    pub name: String,
    pub reason: MismatchReason,
}

impl Mismatch {
    pub fn new(name: impl Into<String>, reason: MismatchReason) -> Self {
        Self {
            name: name.into(),
            reason,
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.reason)
    }
}

fn join(mismatches: &[Mismatch]) -> String {
    mismatches
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Outcome of a nullability check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NullabilityReport {
    pub model: String,
    pub matches: bool,
    /// NOT NULL columns without a present default, after filtering
    pub not_null_columns: Vec<String>,
    /// Columns backed by unconditional presence validation, after filtering
    pub present_columns: Vec<String>,
    pub mismatches: Vec<Mismatch>,
}

impl NullabilityReport {
    /// Comma-joined mismatch messages; empty when the check matched
    pub fn explain(&self) -> String {
        join(&self.mismatches)
    }
}

/// Outcome of a uniqueness check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UniquenessReport {
    pub model: String,
    pub matches: bool,
    pub validator_scopes: Vec<UniqueScope>,
    pub schema_scopes: Vec<UniqueScope>,
    /// Scopes exempt from uniqueness validation through an absence validator
    pub absent_scopes: Vec<UniqueScope>,
    pub mismatches: Vec<Mismatch>,
}

impl UniquenessReport {
    pub fn explain(&self) -> String {
        join(&self.mismatches)
    }
}

/// Pass/fail outcome in the shape a test runner consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assertion {
    passed: bool,
    failure_message: String,
    negated_failure_message: String,
    description: &'static str,
}

impl Assertion {
    pub(crate) fn new(
        passed: bool,
        failure_message: String,
        negated_failure_message: String,
        description: &'static str,
    ) -> Self {
        Self {
            passed,
            failure_message,
            negated_failure_message,
            description,
        }
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    /// Shown when the assertion was expected to pass and did not
    pub fn failure_message(&self) -> &str {
        &self.failure_message
    }

    /// Shown when the assertion was expected to fail and passed
    pub fn negated_failure_message(&self) -> &str {
        &self.negated_failure_message
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    /// `Err(failure_message)` unless the assertion passed
    pub fn verify(&self) -> Result<(), String> {
        if self.passed {
            Ok(())
        } else {
            Err(self.failure_message.clone())
        }
    }

    /// `Err(negated_failure_message)` if the assertion passed
    pub fn verify_negated(&self) -> Result<(), String> {
        if self.passed {
            Err(self.negated_failure_message.clone())
        } else {
            Ok(())
        }
    }
}
