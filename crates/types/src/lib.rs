//! Core types shared across the DAQ simulator.
//!
//! This crate holds the small, dependency-light building blocks: the run
//! identifier and the naming conventions derived from it, wall-clock
//! timestamp rendering in the fixed testbed format, and the streaming
//! Adler-32 checksum used to fingerprint persisted STF files.

mod checksum;
mod identifiers;
mod timestamp;

pub use checksum::{file_checksum, Adler32, CHECKSUM_CHUNK_SIZE};
pub use identifiers::RunId;
pub use timestamp::{format_compact, format_compact_micros, now_compact, now_compact_micros};
