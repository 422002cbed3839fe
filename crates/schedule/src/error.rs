//! Schedule loading errors.

use thiserror::Error;

/// Errors raised while loading a schedule.
///
/// All of these are fatal at load time: a run never starts on a schedule
/// that did not parse cleanly.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The schedule file could not be read.
    #[error("Failed to read schedule file {path}: {source}")]
    Io {
        /// Path that failed to open or read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The schedule file was not valid YAML of the expected shape.
    #[error("Failed to parse schedule: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A span was not exactly five comma-separated non-negative integers.
    #[error("Invalid span {raw:?}: {reason}")]
    Span {
        /// The span string as written in the schedule.
        raw: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The schedule contained no segments.
    #[error("Schedule is empty")]
    Empty,
}
