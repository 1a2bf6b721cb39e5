//! Process-wide configuration
//!
//! A single setting: the error logger used when default-expression probing
//! fails. It starts as a [`JsonLogger`] on stderr. Override it once at
//! startup, before any check runs:
//!
//! ```ignore
//! use std::sync::Arc;
//! use schema_expectations::config;
//! use schema_expectations::observability::MemoryLogger;
//!
//! config::configure(|config| {
//!     config.error_logger = Arc::new(MemoryLogger::new());
//! });
//! ```

use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};

use crate::observability::{ErrorLogger, JsonLogger};

/// Configuration values
#[derive(Clone)]
pub struct Config {
    /// Receives failed default probes
    pub error_logger: Arc<dyn ErrorLogger>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            error_logger: Arc::new(JsonLogger::stderr()),
        }
    }
}

impl Config {
    /// Restores the defaults
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config").finish_non_exhaustive()
    }
}

static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

fn global() -> &'static RwLock<Config> {
    CONFIG.get_or_init(|| RwLock::new(Config::default()))
}

/// Mutates the process-wide configuration
pub fn configure<F>(f: F)
where
    F: FnOnce(&mut Config),
{
    let mut config = match global().write() {
        Ok(config) => config,
        Err(poisoned) => poisoned.into_inner(),
    };
    f(&mut config);
}

/// Restores the process-wide defaults
pub fn reset() {
    configure(Config::reset);
}

/// The process-wide error logger
pub fn error_logger() -> Arc<dyn ErrorLogger> {
    let config = match global().read() {
        Ok(config) => config,
        Err(poisoned) => poisoned.into_inner(),
    };
    Arc::clone(&config.error_logger)
}
