//! Column view
//!
//! Immutable, filtered view over a model's columns. Every filter returns a
//! new view; the column order is always the model's native order.
//!
//! Default-expression probes are memoized in a cache shared by every view
//! derived from the same root, so one check evaluates each distinct
//! expression at most once.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::Arc;

use crate::model::{is_blank, Column, Model};
use crate::observability::{events, ErrorLogger};

use super::scope::{normalize, UniqueScope};

/// Expression -> "evaluates to a present value"
type ProbeCache = RefCell<HashMap<String, bool>>;

#[derive(Clone)]
pub struct ColumnView<'a> {
    model: &'a dyn Model,
    columns: Vec<&'a Column>,
    probes: Rc<ProbeCache>,
    logger: Arc<dyn ErrorLogger>,
}

impl<'a> ColumnView<'a> {
    /// Creates a view over every column of `model`, logging probe failures
    /// through the process-wide error logger.
    pub fn new(model: &'a dyn Model) -> Self {
        Self::with_logger(model, crate::config::error_logger())
    }

    pub fn with_logger(model: &'a dyn Model, logger: Arc<dyn ErrorLogger>) -> Self {
        Self {
            model,
            columns: model.columns().iter().collect(),
            probes: Rc::new(RefCell::new(HashMap::new())),
            logger,
        }
    }

    /// Held columns in native order
    pub fn columns(&self) -> &[&'a Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|column| column.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Columns declared NOT NULL
    pub fn not_null(&self) -> Self {
        self.filtered(|column| !column.nullable)
    }

    /// Columns backing the given attributes.
    ///
    /// Belongs-to associations resolve to their foreign key (plus the foreign
    /// type when polymorphic); any other name is taken literally. Names that
    /// match no column contribute nothing.
    pub fn for_attributes<S: AsRef<str>>(&self, attributes: &[S]) -> Self {
        let names: HashSet<String> = attributes
            .iter()
            .flat_map(|attribute| self.attribute_to_column_names(attribute.as_ref()))
            .collect();
        self.filtered(|column| names.contains(&column.name))
    }

    /// Physical column names an attribute maps to
    pub fn attribute_to_column_names(&self, attribute: &str) -> Vec<String> {
        match self.model.association(attribute) {
            Some(association) if association.is_belongs_to() => association.column_names(),
            _ => vec![attribute.to_string()],
        }
    }

    /// Drops columns that are always populated whatever the validations say:
    /// non-blank literal defaults, the primary key, managed timestamps, and
    /// default expressions that evaluate to a non-blank value.
    pub fn without_present_default(&self) -> Self {
        let primary_key = self.model.primary_key();
        let timestamps = if self.model.record_timestamps() {
            self.model.timestamp_attributes()
        } else {
            Vec::new()
        };

        self.filtered(|column| {
            let literal = column.default.as_ref().map_or(false, |value| !is_blank(value));
            let primary = primary_key == Some(column.name.as_str());
            let timestamp = timestamps.contains(&column.name);

            !(literal || primary || timestamp || self.has_present_default_function(column))
        })
    }

    /// Every unique index of the model as a sorted scope, deduplicated.
    pub fn unique_scopes(&self) -> Vec<UniqueScope> {
        normalize(
            self.model
                .indexes()
                .iter()
                .filter(|index| index.unique)
                .map(|index| UniqueScope::new(index.columns.iter().cloned()))
                .collect(),
        )
    }

    fn filtered<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&Column) -> bool,
    {
        Self {
            model: self.model,
            columns: self
                .columns
                .iter()
                .copied()
                .filter(|column| keep(*column))
                .collect(),
            probes: Rc::clone(&self.probes),
            logger: Arc::clone(&self.logger),
        }
    }

    /// Evaluates the column's default expression (once per expression).
    ///
    /// A failed probe is logged and counts as "no present default", leaving
    /// the column subject to presence validation. The cache is keyed by
    /// expression, not column: when several columns share a failing
    /// expression, one record is logged, naming the first column evaluated.
    fn has_present_default_function(&self, column: &Column) -> bool {
        let expression = match &column.default_function {
            Some(expression) => expression,
            None => return false,
        };

        if let Some(present) = self.probes.borrow().get(expression) {
            return *present;
        }

        let present = match self.model.probe_default(expression) {
            Ok(value) => !is_blank(&value),
            Err(err) => {
                let error = err.to_string();
                self.logger.error(
                    events::DEFAULT_PROBE_FAILED,
                    &[
                        ("code", err.code()),
                        ("column", column.name.as_str()),
                        ("error", error.as_str()),
                        ("expression", expression.as_str()),
                        ("model", self.model.name()),
                    ],
                );
                false
            }
        };

        self.probes
            .borrow_mut()
            .insert(expression.clone(), present);
        present
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Association, Index, ModelDefinition};
    use crate::observability::{MemoryLogger, NullLogger};
    use serde_json::json;

    fn view(model: &ModelDefinition) -> ColumnView<'_> {
        ColumnView::with_logger(model, Arc::new(NullLogger))
    }

    #[test]
    fn test_not_null() {
        let model = ModelDefinition::table("Record", "records")
            .column(Column::new("not_null").not_null())
            .column(Column::new("nullable"));

        let columns = view(&model);
        assert_eq!(columns.column_names(), vec!["id", "not_null", "nullable"]);
        assert_eq!(columns.not_null().column_names(), vec!["id", "not_null"]);
    }

    #[test]
    fn test_without_present_default_filters_literal_defaults() {
        let model = ModelDefinition::table("Record", "records")
            .column(Column::new("integer_default").with_default(0))
            .column(Column::new("string_default").with_default("test"))
            .column(Column::new("empty_default").with_default(""))
            .column(Column::new("null_default").with_default(json!(null)))
            .column(Column::new("no_default"))
            .timestamps();

        let columns = view(&model);
        assert_eq!(
            columns.column_names(),
            vec![
                "id",
                "integer_default",
                "string_default",
                "empty_default",
                "null_default",
                "no_default",
                "created_at",
                "updated_at"
            ]
        );
        assert_eq!(
            columns.without_present_default().column_names(),
            vec!["empty_default", "null_default", "no_default"]
        );
    }

    #[test]
    fn test_timestamps_kept_when_not_managed() {
        let model = ModelDefinition::table("Record", "records")
            .timestamps()
            .without_record_timestamps();

        assert_eq!(
            view(&model).without_present_default().column_names(),
            vec!["created_at", "updated_at"]
        );
    }

    #[test]
    fn test_without_present_default_evaluates_functions() {
        let model = ModelDefinition::table("Record", "records")
            .column(Column::new("function_default").with_default_function("RAND()"))
            .column(Column::new("uuid_default").with_default_function("gen_random_uuid()"))
            .column(Column::new("blank_function").with_default_function("''"))
            .column(Column::new("no_default"))
            .evaluates("RAND()", 0.25)
            .evaluates("gen_random_uuid()", "6f1c3c1e-2b1f-4d55-9d6e-0c7f1a2b3c4d")
            .evaluates("''", "");

        assert_eq!(
            view(&model).without_present_default().column_names(),
            vec!["blank_function", "no_default"]
        );
    }

    #[test]
    fn test_failed_probe_is_logged_and_not_exempt() {
        let model = ModelDefinition::table("Record", "records")
            .column(Column::new("broken").with_default_function("nextval('missing')"));

        let logger = Arc::new(MemoryLogger::new());
        let columns = ColumnView::with_logger(&model, logger.clone());

        assert_eq!(columns.without_present_default().column_names(), vec!["broken"]);

        let records = logger.records();
        assert_eq!(records.len(), 1);
        assert!(records[0].contains("DEFAULT_PROBE_FAILED"));
        assert!(records[0].contains("\"column\":\"broken\""));
        assert!(records[0].contains("nextval('missing')"));
    }

    #[test]
    fn test_probe_runs_once_per_expression() {
        let model = ModelDefinition::table("Record", "records")
            .column(Column::new("a").not_null().with_default_function("broken()"))
            .column(Column::new("b").not_null().with_default_function("broken()"));

        let logger = Arc::new(MemoryLogger::new());
        let columns = ColumnView::with_logger(&model, logger.clone());

        let first = columns.not_null().without_present_default();
        let second = columns.for_attributes(&["a", "b"]).without_present_default();
        assert_eq!(first.column_names(), vec!["a", "b"]);
        assert_eq!(second.column_names(), vec!["a", "b"]);

        // Both views share the cache of their root
        assert_eq!(logger.len(), 1);
        let record: serde_json::Value = serde_json::from_str(&logger.records()[0]).unwrap();
        assert_eq!(record["column"], "a");
        assert_eq!(record["expression"], "broken()");
    }

    fn association_model() -> ModelDefinition {
        ModelDefinition::table("Record", "records")
            .column(Column::new("record_id"))
            .column(Column::new("record_type"))
            .column(Column::new("other"))
    }

    #[test]
    fn test_for_attributes_without_associations() {
        let model = association_model();
        let columns = view(&model);

        assert!(columns.for_attributes(&["missing"]).is_empty());
        assert!(columns.for_attributes(&["record"]).is_empty());
        assert_eq!(columns.for_attributes(&["record_id"]).column_names(), vec!["record_id"]);
        assert_eq!(columns.for_attributes(&["other"]).column_names(), vec!["other"]);
        assert_eq!(
            columns.for_attributes(&["record", "missing", "other"]).column_names(),
            vec!["other"]
        );
    }

    #[test]
    fn test_for_attributes_belongs_to_polymorphic() {
        let model = association_model().association(Association::polymorphic("record"));
        let columns = view(&model);

        assert_eq!(
            columns.for_attributes(&["record"]).column_names(),
            vec!["record_id", "record_type"]
        );
        assert_eq!(
            columns.for_attributes(&["record", "missing", "other"]).column_names(),
            vec!["record_id", "record_type", "other"]
        );
    }

    #[test]
    fn test_for_attributes_belongs_to() {
        let model = association_model().association(Association::belongs_to("record"));
        let columns = view(&model);

        assert_eq!(columns.for_attributes(&["record"]).column_names(), vec!["record_id"]);
        assert_eq!(
            columns.for_attributes(&["record_type"]).column_names(),
            vec!["record_type"]
        );
        assert_eq!(
            columns.for_attributes(&["record", "missing", "other"]).column_names(),
            vec!["record_id", "other"]
        );
    }

    #[test]
    fn test_for_attributes_ignores_has_many() {
        let model = association_model().association(Association::has_many("record", "record_id"));
        assert!(view(&model).for_attributes(&["record"]).is_empty());
    }

    #[test]
    fn test_unique_scopes() {
        let model = ModelDefinition::table("Record", "records")
            .index(Index::unique(["b", "a"]))
            .index(Index::unique(["a", "b"]))
            .index(Index::non_unique(["c"]))
            .index(Index::unique(["c"]));

        let scopes: Vec<_> = view(&model)
            .unique_scopes()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(scopes, vec!["[a, b]", "[c]"]);
    }
}
