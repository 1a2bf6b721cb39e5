//! Consistency checks between a model and its schema
//!
//! - [`NullabilityCheck`]: NOT NULL columns vs presence validation
//! - [`UniquenessCheck`]: unique indexes vs uniqueness validation
//!
//! Each check builds fresh views of the model, diffs two sets and returns a
//! report. [`assert_nullability_consistent`] and
//! [`assert_uniqueness_consistent`] turn a report into an [`Assertion`] for
//! test runners; the `assert_schema_*` macros panic on failure.

mod errors;
mod nullability;
mod options;
mod report;
mod uniqueness;

pub use errors::{CheckError, CheckResult};
pub use nullability::NullabilityCheck;
pub use options::{CheckOptions, ColumnFilter};
pub use report::{Assertion, Mismatch, MismatchReason, NullabilityReport, UniquenessReport};
pub use uniqueness::UniquenessCheck;

use std::collections::HashSet;

use crate::model::Model;

/// Rejects models without a backing table, or with two columns of the same
/// name, before any reflection happens.
pub(crate) fn validate_subject(model: &dyn Model) -> CheckResult<()> {
    if model.table_name().is_none() {
        return Err(CheckError::TypeMismatch {
            subject: model.name().to_string(),
        });
    }

    let mut seen = HashSet::new();
    for column in model.columns() {
        if !seen.insert(column.name.as_str()) {
            return Err(CheckError::DuplicateColumn {
                model: model.name().to_string(),
                column: column.name.clone(),
            });
        }
    }

    Ok(())
}

/// Asserts NOT NULL columns and presence validation agree.
pub fn assert_nullability_consistent(
    model: &dyn Model,
    options: &CheckOptions,
) -> CheckResult<Assertion> {
    let report = NullabilityCheck::new(options.clone()).check(model)?;
    Ok(Assertion::new(
        report.matches,
        report.explain(),
        format!(
            "{} should not match NOT NULL with its presence validation but does",
            report.model
        ),
        nullability::DESCRIPTION,
    ))
}

/// Asserts unique indexes and uniqueness validation agree.
pub fn assert_uniqueness_consistent(
    model: &dyn Model,
    options: &CheckOptions,
) -> CheckResult<Assertion> {
    let report = UniquenessCheck::new(options.clone()).check(model)?;
    Ok(Assertion::new(
        report.matches,
        report.explain(),
        format!(
            "{} should not match unique indexes with its uniqueness validation but does",
            report.model
        ),
        uniqueness::DESCRIPTION,
    ))
}

/// Panics unless the model's nullability is consistent.
///
/// ```ignore
/// assert_schema_nullable!(&record);
/// assert_schema_nullable!(&record, CheckOptions::except(["legacy_flag"])?);
/// ```
#[macro_export]
macro_rules! assert_schema_nullable {
    ($model:expr) => {
        $crate::assert_schema_nullable!($model, $crate::check::CheckOptions::all())
    };
    ($model:expr, $options:expr) => {
        match $crate::check::assert_nullability_consistent($model, &$options) {
            Ok(assertion) => {
                if let Err(message) = assertion.verify() {
                    panic!("{}", message);
                }
            }
            Err(err) => panic!("{}", err),
        }
    };
}

/// Panics unless the model's uniqueness is consistent.
#[macro_export]
macro_rules! assert_schema_uniqueness {
    ($model:expr) => {
        $crate::assert_schema_uniqueness!($model, $crate::check::CheckOptions::all())
    };
    ($model:expr, $options:expr) => {
        match $crate::check::assert_uniqueness_consistent($model, &$options) {
            Ok(assertion) => {
                if let Err(message) = assertion.verify() {
                    panic!("{}", message);
                }
            }
            Err(err) => panic!("{}", err),
        }
    };
}
