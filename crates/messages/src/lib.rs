//! Event payloads emitted by the DAQ simulator.
//!
//! Field names are part of the wire contract with downstream agents and
//! must not change. Every payload carries a `msg_type` discriminator and
//! serializes to JSON.

mod events;

pub use events::{Event, RunConditions, StfMetadata};

/// Topic all simulator events are published on.
pub const EVENT_TOPIC: &str = "epictopic";

/// Headers attached to every published event.
pub const PERSISTENT_HEADERS: [(&str, &str); 1] = [("persistent", "true")];
