//! Run errors.

use daqsim_core::RegistryError;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors of a simulation run.
///
/// Everything here aborts: configuration and registry failures before the
/// run reaches `Running`, persistence failures mid-run. Transport send
/// failures and heartbeat failures are logged at the call site and never
/// reach this type; operator cancellation is an outcome, not an error.
#[derive(Debug, Error)]
pub enum RunError {
    /// The engine configuration failed validation.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The run registry could not allocate a run id.
    #[error("Failed to acquire run id: {0}")]
    Registry(#[from] RegistryError),

    /// The per-run output directory could not be created.
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An STF artifact could not be written or digested.
    #[error("Failed to persist STF {path}: {source}")]
    Persistence {
        /// Artifact path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A simulation task died unexpectedly.
    #[error("Simulation task failed: {0}")]
    Task(String),
}
