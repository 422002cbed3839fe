//! REST client for the run monitor.
//!
//! Implements the [`RunRegistry`] capability against the monitor's HTTP
//! API: run-number allocation and agent heartbeats. The engine only ever
//! sees the trait; this crate is wired in by the binary when monitor mode
//! is enabled.

mod client;

pub use client::{HttpRunRegistry, MonitorConfig};
