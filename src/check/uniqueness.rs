//! Uniqueness check
//!
//! Unique index scopes must match the scopes of unconditional uniqueness
//! validators. A scope touching a column that must always be absent needs no
//! uniqueness validation.
//!
//! With `only`/`except`, a scope takes part only as a whole: one excluded
//! member removes it from both sides.

use std::sync::Arc;

use crate::model::{Conditions, Model};
use crate::observability::ErrorLogger;
use crate::reflect::{ColumnView, UniqueScope, ValidationView};

use super::validate_subject;
use super::errors::CheckResult;
use super::options::CheckOptions;
use super::report::{Mismatch, MismatchReason, UniquenessReport};

pub const DESCRIPTION: &str = "validate unique indexes have uniqueness validation";

/// Reconciles unique indexes with uniqueness validation.
#[derive(Clone, Default)]
pub struct UniquenessCheck {
    options: CheckOptions,
    logger: Option<Arc<dyn ErrorLogger>>,
}

impl UniquenessCheck {
    pub fn new(options: CheckOptions) -> Self {
        Self {
            options,
            logger: None,
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn ErrorLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn options(&self) -> &CheckOptions {
        &self.options
    }

    /// # Errors
    ///
    /// `TypeMismatch` if the model has no backing table, `DuplicateColumn`
    /// if two of its columns share a name.
    pub fn check(&self, model: &dyn Model) -> CheckResult<UniquenessReport> {
        validate_subject(model)?;

        let columns = match &self.logger {
            Some(logger) => ColumnView::with_logger(model, Arc::clone(logger)),
            None => ColumnView::new(model),
        };
        let validations = ValidationView::new(model);

        let validator_scopes = self
            .options
            .filter_scopes(validations.unconditional().disallow_empty().unique_scopes());
        let schema_scopes = self.options.filter_scopes(columns.unique_scopes());
        let absent_scopes = absent_scopes(&columns, &validations, &validator_scopes, &schema_scopes);

        let mut mismatches = Vec::new();

        for scope in validator_scopes.iter().filter(|s| !schema_scopes.contains(s)) {
            mismatches.push(Mismatch::new(
                scope_name(model, scope),
                MismatchReason::MissingUniqueIndex,
            ));
        }

        let unvalidated = schema_scopes
            .iter()
            .filter(|s| !validator_scopes.contains(s) && !absent_scopes.contains(s));
        for scope in unvalidated {
            let reason = match uniqueness_conditions(&validations, scope) {
                Some(conditions) => MismatchReason::ConditionalUniqueness(conditions),
                None => MismatchReason::MissingUniqueness,
            };
            mismatches.push(Mismatch::new(scope_name(model, scope), reason));
        }

        let matches = mismatches.is_empty();
        tracing::debug!(
            model = model.name(),
            matches,
            validator_scopes = validator_scopes.len(),
            schema_scopes = schema_scopes.len(),
            absent_scopes = absent_scopes.len(),
            "uniqueness check"
        );

        Ok(UniquenessReport {
            model: model.name().to_string(),
            matches,
            validator_scopes,
            schema_scopes,
            absent_scopes,
            mismatches,
        })
    }
}

fn scope_name(model: &dyn Model, scope: &UniqueScope) -> String {
    format!("{} scope {}", model.name(), scope)
}

/// Scopes (from either side) containing a column that an unconditional,
/// non-emptyable absence validator keeps empty.
fn absent_scopes(
    columns: &ColumnView<'_>,
    validations: &ValidationView<'_>,
    validator_scopes: &[UniqueScope],
    schema_scopes: &[UniqueScope],
) -> Vec<UniqueScope> {
    let absent_attributes = validations
        .absence()
        .unconditional()
        .disallow_empty()
        .attributes();
    if absent_attributes.is_empty() {
        return Vec::new();
    }
    let absent_columns = columns.for_attributes(&absent_attributes).column_names();

    let mut scopes: Vec<UniqueScope> = validator_scopes
        .iter()
        .chain(schema_scopes)
        .filter(|scope| scope.intersects(&absent_columns))
        .cloned()
        .collect();
    scopes.sort();
    scopes.dedup();
    scopes
}

/// First run condition across the scope's validators, else the first
/// `allow_blank`.
fn uniqueness_conditions(validations: &ValidationView<'_>, scope: &UniqueScope) -> Option<Conditions> {
    let matching = validations.for_unique_scope(scope);
    let attributes = matching.attributes();

    attributes
        .iter()
        .find_map(|attribute| matching.conditions_for_attribute(attribute))
        .or_else(|| {
            attributes
                .iter()
                .find_map(|attribute| matching.allow_empty_conditions_for_attribute(attribute))
        })
}
