//! Observability for schema checks
//!
//! Recovered errors (failed default-expression probes) are written through
//! an [`ErrorLogger`] as single-line JSON records. The process-wide logger
//! lives in [`crate::config`]; checkers can also be handed one directly.
//!
//! Diagnostic detail about what each check computed goes through `tracing`
//! at debug level and is invisible unless the host installs a subscriber.

mod logger;

pub use logger::{format_record, ErrorLogger, JsonLogger, MemoryLogger, NullLogger};

/// Lifecycle events written to the error logger
pub mod events {
    /// A default expression could not be evaluated
    pub const DEFAULT_PROBE_FAILED: &str = "DEFAULT_PROBE_FAILED";
}
