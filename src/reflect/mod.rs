//! Reflection over a model
//!
//! Two views, both immutable and rebuilt for every check:
//! - [`ColumnView`]: columns filtered by nullability and present defaults,
//!   attribute-to-column resolution, unique index scopes
//! - [`ValidationView`]: validators filtered by kind and options, their
//!   conditions, and the unique scopes they declare

mod columns;
mod scope;
mod validations;

pub use columns::ColumnView;
pub use scope::UniqueScope;
pub use validations::ValidationView;
