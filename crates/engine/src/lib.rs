//! Schedule-driven real-time simulation engine.
//!
//! One virtual clock paces two cooperating tasks:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ DaqRunner:  Idle -> RunImminent -> Running -> Ended        │
//! │                                                            │
//! │  ┌──────────────┐  tick   ┌───────────────────────────┐    │
//! │  │ VirtualClock │────────▶│ state tracker             │    │
//! │  │ (factor,     │         │ schedule -> EngineState   │    │
//! │  │  until)      │         └─────────────┬─────────────┘    │
//! │  │              │                       │ (state,substate) │
//! │  │              │  rand   ┌─────────────▼─────────────┐    │
//! │  │              │────────▶│ STF generator             │    │
//! │  └──────────────┘         │ descriptor -> file, event │    │
//! │                           └───────────────────────────┘    │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! The tracker is the sole writer of the shared `(index, state, substate)`
//! tuple and the generator its sole reader; the tuple is replaced
//! atomically but reads are deliberately not synchronized against the
//! tick, so an artifact built exactly on a breakpoint may carry the label
//! of either side. The schedule granularity is coarse relative to the STF
//! rate, so this is accepted rather than locked away.

mod clock;
mod config;
mod error;
mod generator;
mod runner;
mod state;
mod tracker;

pub use clock::{ClockOutcome, Tick, VirtualClock};
pub use config::DaqConfig;
pub use error::RunError;
pub use runner::{DaqRunner, RunOutcome, RunPhase, RunSummary};
pub use state::{EngineState, RunContext, StatePoint};
