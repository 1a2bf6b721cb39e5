//! Nullability check
//!
//! NOT NULL columns must be covered by an unconditional, non-nilable
//! presence validator and vice versa. Columns that are always populated
//! (present defaults, primary key, managed timestamps) are left out of both
//! sides.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::model::{Conditions, Model};
use crate::observability::ErrorLogger;
use crate::reflect::{ColumnView, ValidationView};

use super::validate_subject;
use super::errors::CheckResult;
use super::options::CheckOptions;
use super::report::{Mismatch, MismatchReason, NullabilityReport};

pub const DESCRIPTION: &str = "validate NOT NULL columns have presence validation";

/// Reconciles NOT NULL constraints with presence validation.
#[derive(Clone, Default)]
pub struct NullabilityCheck {
    options: CheckOptions,
    logger: Option<Arc<dyn ErrorLogger>>,
}

impl NullabilityCheck {
    pub fn new(options: CheckOptions) -> Self {
        Self {
            options,
            logger: None,
        }
    }

    /// Logs probe failures here instead of the process-wide logger
    pub fn with_logger(mut self, logger: Arc<dyn ErrorLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn options(&self) -> &CheckOptions {
        &self.options
    }

    /// Runs the check against the model's current metadata.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if the model has no backing table, `DuplicateColumn`
    /// if two of its columns share a name.
    pub fn check(&self, model: &dyn Model) -> CheckResult<NullabilityReport> {
        validate_subject(model)?;

        let columns = match &self.logger {
            Some(logger) => ColumnView::with_logger(model, Arc::clone(logger)),
            None => ColumnView::new(model),
        };
        let validations = ValidationView::new(model);

        let not_null_columns = self
            .options
            .filter_names(columns.not_null().without_present_default().column_names());

        let present_attributes = validations
            .presence()
            .unconditional()
            .disallow_nil()
            .attributes();
        let present_columns = self.options.filter_names(
            columns
                .for_attributes(&present_attributes)
                .without_present_default()
                .column_names(),
        );

        let not_null: BTreeSet<&String> = not_null_columns.iter().collect();
        let present: BTreeSet<&String> = present_columns.iter().collect();

        let mut mismatches = Vec::new();

        for column in present.difference(&not_null) {
            mismatches.push(Mismatch::new(*column, MismatchReason::MissingNotNull));
        }

        for column in not_null.difference(&present) {
            let reason = match presence_conditions(&columns, &validations, column) {
                Some(conditions) => MismatchReason::ConditionalPresence(conditions),
                None => MismatchReason::MissingPresence,
            };
            mismatches.push(Mismatch::new(*column, reason));
        }

        let matches = mismatches.is_empty();
        tracing::debug!(
            model = model.name(),
            matches,
            not_null = ?not_null_columns,
            present = ?present_columns,
            "nullability check"
        );

        Ok(NullabilityReport {
            model: model.name().to_string(),
            matches,
            not_null_columns,
            present_columns,
            mismatches,
        })
    }
}

/// Conditions of a presence validator on an attribute backed by `column`.
///
/// `allow_nil` / `allow_blank` take priority over `on` / `if` / `unless`.
fn presence_conditions(
    columns: &ColumnView<'_>,
    validations: &ValidationView<'_>,
    column: &str,
) -> Option<Conditions> {
    let presence = validations.presence();
    let attributes: Vec<String> = presence
        .attributes()
        .into_iter()
        .filter(|attribute| {
            columns
                .attribute_to_column_names(attribute)
                .iter()
                .any(|name| name == column)
        })
        .collect();

    attributes
        .iter()
        .find_map(|attribute| presence.allow_nil_conditions_for_attribute(attribute))
        .or_else(|| {
            attributes
                .iter()
                .find_map(|attribute| presence.conditions_for_attribute(attribute))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::CheckError;
    use crate::model::{Association, Column, ModelDefinition, OptionValue, Validator};
    use crate::observability::NullLogger;

    fn check(model: &ModelDefinition, options: CheckOptions) -> NullabilityReport {
        NullabilityCheck::new(options)
            .with_logger(Arc::new(NullLogger))
            .check(model)
            .unwrap()
    }

    fn records() -> ModelDefinition {
        ModelDefinition::table("Record", "records")
            .column(Column::new("not_null").not_null())
            .column(Column::new("not_null_present").not_null())
            .column(Column::new("nullable"))
            .column(Column::new("nullable_present"))
            .validates(Validator::presence(["not_null_present"]))
            .validates(Validator::presence(["nullable_present"]))
    }

    #[test]
    fn test_only_and_except() {
        let model = records();

        assert!(check(&model, CheckOptions::only(["not_null_present", "nullable"]).unwrap()).matches);
        assert!(check(&model, CheckOptions::except(["not_null", "nullable_present"]).unwrap()).matches);

        assert!(!check(&model, CheckOptions::all()).matches);
        assert!(!check(&model, CheckOptions::only(["not_null"]).unwrap()).matches);
        assert!(!check(&model, CheckOptions::only(["nullable_present"]).unwrap()).matches);
    }

    #[test]
    fn test_messages() {
        let model = records();

        assert_eq!(
            check(&model, CheckOptions::only(["not_null"]).unwrap()).explain(),
            "not_null is NOT NULL but has no presence validation"
        );
        assert_eq!(
            check(&model, CheckOptions::only(["nullable_present"]).unwrap()).explain(),
            "nullable_present has unconditional presence validation but is missing NOT NULL"
        );
        assert_eq!(
            check(&model, CheckOptions::all()).explain(),
            "nullable_present has unconditional presence validation but is missing NOT NULL, \
             not_null is NOT NULL but has no presence validation"
        );
    }

    fn conditional(validator: Validator) -> String {
        let model = records().clear_validators().validates(validator);
        let report = check(&model, CheckOptions::only(["not_null_present"]).unwrap());
        assert!(!report.matches);
        report.explain()
    }

    #[test]
    fn test_conditional_validators() {
        assert_eq!(
            conditional(Validator::presence(["not_null_present"]).with("on", "create")),
            "not_null_present is NOT NULL but its presence validator was conditional: {on: create}"
        );
        assert_eq!(
            conditional(
                Validator::presence(["not_null_present"]).with("if", OptionValue::predicate("active?"))
            ),
            "not_null_present is NOT NULL but its presence validator was conditional: {if: <active?>}"
        );
        assert_eq!(
            conditional(
                Validator::presence(["not_null_present"]).with("unless", OptionValue::predicate("draft?"))
            ),
            "not_null_present is NOT NULL but its presence validator was conditional: {unless: <draft?>}"
        );
        assert_eq!(
            conditional(Validator::presence(["not_null_present"]).with("allow_nil", true)),
            "not_null_present is NOT NULL but its presence validator was conditional: {allow_nil: true}"
        );
        assert_eq!(
            conditional(Validator::presence(["not_null_present"]).with("allow_blank", true)),
            "not_null_present is NOT NULL but its presence validator was conditional: {allow_blank: true}"
        );
    }

    #[test]
    fn test_allow_nil_reported_before_run_conditions() {
        let message = conditional(
            Validator::presence(["not_null_present"])
                .with("on", "create")
                .with("allow_nil", true),
        );
        assert!(message.ends_with("{allow_nil: true}"));
    }

    #[test]
    fn test_present_defaults_are_ignored() {
        let model = ModelDefinition::table("Record", "records")
            .column(Column::new("status").not_null().with_default("draft"))
            .column(Column::new("token").not_null().with_default_function("gen_random_uuid()"))
            .evaluates("gen_random_uuid()", "c0ffee00-0000-4000-8000-000000000000")
            .timestamps()
            .validates(Validator::presence(["status"]));

        let report = check(&model, CheckOptions::all());
        assert!(report.matches, "{}", report.explain());
        assert!(report.not_null_columns.is_empty());
        assert!(report.present_columns.is_empty());
    }

    #[test]
    fn test_belongs_to_resolves_to_foreign_key() {
        let model = ModelDefinition::table("Comment", "comments")
            .column(Column::new("post_id").not_null())
            .column(Column::new("author_id").not_null())
            .column(Column::new("author_type").not_null())
            .association(Association::belongs_to("post"))
            .association(Association::polymorphic("author"))
            .validates(Validator::presence(["post", "author"]));

        let report = check(&model, CheckOptions::all());
        assert!(report.matches, "{}", report.explain());
        assert_eq!(report.present_columns, vec!["post_id", "author_id", "author_type"]);
    }

    #[test]
    fn test_conditional_association_reported_on_column() {
        let model = ModelDefinition::table("Comment", "comments")
            .column(Column::new("post_id").not_null())
            .association(Association::belongs_to("post"))
            .validates(Validator::presence(["post"]).with("on", "update"));

        assert_eq!(
            check(&model, CheckOptions::all()).explain(),
            "post_id is NOT NULL but its presence validator was conditional: {on: update}"
        );
    }

    #[test]
    fn test_abstract_model_rejected() {
        let model = ModelDefinition::new("ApplicationRecord", "application_records").abstract_model();
        let err = NullabilityCheck::default().check(&model).unwrap_err();
        assert_eq!(
            err,
            CheckError::TypeMismatch {
                subject: "ApplicationRecord".into()
            }
        );
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let model = ModelDefinition::table("Record", "records")
            .column(Column::new("a").not_null())
            .column(Column::new("a").not_null())
            .validates(Validator::presence(["a"]));

        let err = NullabilityCheck::default()
            .with_logger(Arc::new(NullLogger))
            .check(&model)
            .unwrap_err();
        assert_eq!(
            err,
            CheckError::DuplicateColumn {
                model: "Record".into(),
                column: "a".into()
            }
        );
    }
}
