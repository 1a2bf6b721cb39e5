//! Model reflection interface
//!
//! The checkers never talk to an ORM directly. A host adapter implements
//! [`Model`] once, exposing:
//! - column metadata and the primary key
//! - the validator registry
//! - belongs-to associations
//! - the index list
//! - timestamp management
//! - a probe channel that evaluates server-side default expressions
//!
//! [`ModelDefinition`] is an in-memory implementation that can be built in
//! code or loaded from JSON descriptors by [`ModelLoader`].

mod definition;
mod errors;
mod loader;
mod types;

pub use definition::ModelDefinition;
pub use errors::{ModelError, ModelResult, ProbeError};
pub use loader::ModelLoader;
pub use types::{
    is_blank, Association, AssociationKind, Column, Conditions, Index, OptionKey, OptionValue,
    Validator, ValidatorKind, ValidatorOptions,
};

use serde_json::Value;

/// Attribute names a model stamps automatically when timestamps are managed
pub const DEFAULT_TIMESTAMP_ATTRIBUTES: &[&str] =
    &["created_at", "created_on", "updated_at", "updated_on"];

/// Capability interface a host ORM adapter implements.
///
/// All methods are read-only. `probe_default` is the only one allowed to
/// perform I/O.
pub trait Model {
    /// Model name used in reports (e.g. `Record`)
    fn name(&self) -> &str;

    /// Backing table, or `None` for abstract models
    fn table_name(&self) -> Option<&str>;

    /// Columns in native table order
    fn columns(&self) -> &[Column];

    /// Declared validators in declaration order
    fn validators(&self) -> &[Validator];

    fn associations(&self) -> &[Association];

    fn indexes(&self) -> &[Index];

    fn primary_key(&self) -> Option<&str>;

    /// Whether the model sets timestamp attributes on save
    fn record_timestamps(&self) -> bool;

    fn timestamp_attributes(&self) -> Vec<String> {
        DEFAULT_TIMESTAMP_ATTRIBUTES
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Looks up an association by attribute name
    fn association(&self, attribute: &str) -> Option<&Association> {
        self.associations().iter().find(|a| a.name == attribute)
    }

    /// Evaluates a default expression once and returns the scalar result.
    fn probe_default(&self, expression: &str) -> Result<Value, ProbeError> {
        Err(ProbeError::unsupported(expression))
    }
}
