//! In-memory model descriptor

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

use super::errors::{ModelError, ModelResult, ProbeError};
use super::types::{Association, Column, Index, Validator};
use super::Model;

/// A model described entirely by data.
///
/// Probe results for default expressions are scripted through
/// `evaluated_defaults`; an expression without an entry fails its probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDefinition {
    pub name: String,
    pub table_name: String,
    /// Abstract models have no table and are rejected by the checkers
    #[serde(default, rename = "abstract")]
    pub abstract_model: bool,
    #[serde(default = "default_primary_key")]
    pub primary_key: Option<String>,
    #[serde(default = "default_record_timestamps")]
    pub record_timestamps: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_attributes: Option<Vec<String>>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub validators: Vec<Validator>,
    #[serde(default)]
    pub associations: Vec<Association>,
    #[serde(default)]
    pub indexes: Vec<Index>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub evaluated_defaults: BTreeMap<String, Value>,
}

fn default_primary_key() -> Option<String> {
    Some("id".to_string())
}

fn default_record_timestamps() -> bool {
    true
}

impl ModelDefinition {
    /// Create a model with no columns
    pub fn new(name: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table_name: table_name.into(),
            abstract_model: false,
            primary_key: default_primary_key(),
            record_timestamps: true,
            timestamp_attributes: None,
            columns: Vec::new(),
            validators: Vec::new(),
            associations: Vec::new(),
            indexes: Vec::new(),
            evaluated_defaults: BTreeMap::new(),
        }
    }

    /// Create a model whose table starts with an `id` primary key column,
    /// the way migrations create tables by default
    pub fn table(name: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self::new(name, table_name).column(Column::new("id").not_null())
    }

    /// Builds a descriptor from an untyped JSON value.
    ///
    /// Anything but a JSON object is rejected with `TypeMismatch` naming the
    /// offending value.
    pub fn from_value(value: Value) -> ModelResult<Self> {
        if !value.is_object() {
            return Err(ModelError::TypeMismatch {
                subject: value.to_string(),
            });
        }

        let definition: ModelDefinition =
            serde_json::from_value(value).map_err(|e| ModelError::Malformed {
                path: "<value>".into(),
                reason: e.to_string(),
            })?;
        definition.validate()?;
        Ok(definition)
    }

    /// Checks descriptor invariants (unique column names).
    pub fn validate(&self) -> ModelResult<()> {
        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(ModelError::DuplicateColumn {
                    model: self.name.clone(),
                    column: column.name.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Adds NOT NULL `created_at` / `updated_at` columns
    pub fn timestamps(self) -> Self {
        self.column(Column::new("created_at").not_null())
            .column(Column::new("updated_at").not_null())
    }

    pub fn validates(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn association(mut self, association: Association) -> Self {
        self.associations.push(association);
        self
    }

    pub fn index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    /// Scripts the probe result of a default expression
    pub fn evaluates(mut self, expression: impl Into<String>, result: impl Into<Value>) -> Self {
        self.evaluated_defaults
            .insert(expression.into(), result.into());
        self
    }

    pub fn without_primary_key(mut self) -> Self {
        self.primary_key = None;
        self
    }

    pub fn without_record_timestamps(mut self) -> Self {
        self.record_timestamps = false;
        self
    }

    pub fn abstract_model(mut self) -> Self {
        self.abstract_model = true;
        self
    }

    /// Drops every validator (handy when redefining a model in tests)
    pub fn clear_validators(mut self) -> Self {
        self.validators.clear();
        self
    }
}

impl Model for ModelDefinition {
    fn name(&self) -> &str {
        &self.name
    }

    fn table_name(&self) -> Option<&str> {
        if self.abstract_model {
            None
        } else {
            Some(&self.table_name)
        }
    }

    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn validators(&self) -> &[Validator] {
        &self.validators
    }

    fn associations(&self) -> &[Association] {
        &self.associations
    }

    fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    fn primary_key(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    fn record_timestamps(&self) -> bool {
        self.record_timestamps
    }

    fn timestamp_attributes(&self) -> Vec<String> {
        match &self.timestamp_attributes {
            Some(attributes) => attributes.clone(),
            None => super::DEFAULT_TIMESTAMP_ATTRIBUTES
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }

    fn probe_default(&self, expression: &str) -> Result<Value, ProbeError> {
        self.evaluated_defaults
            .get(expression)
            .cloned()
            .ok_or_else(|| ProbeError::new(expression, "no result recorded for expression"))
    }
}
