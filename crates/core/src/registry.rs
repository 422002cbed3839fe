//! Run registry capability.

use async_trait::async_trait;
use daqsim_types::RunId;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Mutex;
use thiserror::Error;

/// Errors surfaced by a run registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry could not be reached or rejected the request.
    #[error("Registry request failed: {0}")]
    Request(String),

    /// The registry answered, but not in the expected shape.
    #[error("Unexpected registry response: {0}")]
    Response(String),
}

/// Capability to obtain run identifiers and report liveness.
///
/// `next_run_id` failures are fatal (a run cannot start unidentified);
/// `heartbeat` failures are logged by callers and otherwise ignored.
#[async_trait]
pub trait RunRegistry: Send + Sync {
    /// Allocate the identifier for the next run.
    async fn next_run_id(&self) -> Result<RunId, RegistryError>;

    /// Report agent liveness with the given status string.
    async fn heartbeat(&self, status: &str) -> Result<(), RegistryError>;
}

/// Test-mode registry: draws run ids locally instead of asking a monitor.
///
/// Only substituted for the real registry under an explicit test flag,
/// never silently.
pub struct LocalRunRegistry {
    rng: Mutex<ChaCha8Rng>,
}

impl LocalRunRegistry {
    /// Registry with an entropy-seeded id stream.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::from_entropy()),
        }
    }

    /// Registry with a reproducible id stream.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }
}

impl Default for LocalRunRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RunRegistry for LocalRunRegistry {
    async fn next_run_id(&self) -> Result<RunId, RegistryError> {
        let id = self
            .rng
            .lock()
            .map_err(|_| RegistryError::Request("id generator poisoned".into()))?
            .gen_range(1..=1000u64);
        Ok(RunId(id))
    }

    async fn heartbeat(&self, _status: &str) -> Result<(), RegistryError> {
        // Nothing is listening in test mode.
        Ok(())
    }
}
