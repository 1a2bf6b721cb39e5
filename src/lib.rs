//! schema-expectations - keeps model validations and database constraints
//! in agreement
//!
//! Two checks:
//! - nullability: NOT NULL columns vs unconditional presence validation
//! - uniqueness: unique indexes vs unconditional uniqueness validation
//!
//! Models are reached through the [`Model`] trait; [`ModelDefinition`] and
//! [`ModelLoader`] provide an in-memory implementation fed by code or JSON
//! descriptors.

pub mod check;
pub mod cli;
pub mod config;
pub mod model;
pub mod observability;
pub mod reflect;

pub use check::{
    assert_nullability_consistent, assert_uniqueness_consistent, Assertion, CheckError,
    CheckOptions, CheckResult, NullabilityCheck, NullabilityReport, UniquenessCheck,
    UniquenessReport,
};
pub use model::{Model, ModelDefinition, ModelLoader};
