//! Run identifier and the naming conventions derived from it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a single simulation run.
///
/// Obtained from the run registry (or generated locally in test mode)
/// exactly once per run. The dataset name and every STF filename are
/// derived from it, so artifacts of one run always group together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub u64);

impl RunId {
    /// Dataset name grouping all artifacts of this run.
    pub fn dataset(&self) -> String {
        format!("run.{:06}.run", self.0)
    }

    /// Filename for the STF with the given sequence number.
    ///
    /// Sequence numbers are zero-based and strictly increasing within a run.
    pub fn stf_filename(&self, sequence: u64) -> String {
        format!("run.{:06}.{:06}.stf", self.0, sequence)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RunId {
    fn from(id: u64) -> Self {
        RunId(id)
    }
}
