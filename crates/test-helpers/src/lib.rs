//! Test doubles for the simulator's collaborator traits.
//!
//! A [`RecordingSink`] captures published events for assertions, a
//! [`FailingSink`] rejects every send, and the canned registries hand out
//! fixed run ids or fail on demand.

use async_trait::async_trait;
use daqsim_core::{MessageSink, RegistryError, RunRegistry, TransportError};
use daqsim_messages::Event;
use daqsim_schedule::{Schedule, ScheduleEntry};
use daqsim_types::RunId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// One captured publication.
#[derive(Debug, Clone)]
pub struct SentMessage {
    /// Topic it was sent on.
    pub topic: String,
    /// Raw body bytes.
    pub body: Vec<u8>,
    /// Headers as sent.
    pub headers: Vec<(String, String)>,
}

/// Sink that records everything it is asked to send.
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<SentMessage>>,
}

impl RecordingSink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured messages, in send order.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().expect("sink poisoned").clone()
    }

    /// All captured bodies decoded as events, in send order.
    ///
    /// Panics on a body that is not a valid event; tests want to know.
    pub fn events(&self) -> Vec<Event> {
        self.sent()
            .iter()
            .map(|m| serde_json::from_slice(&m.body).expect("captured body is not an Event"))
            .collect()
    }

    /// Captured events matching a predicate.
    pub fn events_where(&self, predicate: impl Fn(&Event) -> bool) -> Vec<Event> {
        self.events().into_iter().filter(|e| predicate(e)).collect()
    }
}

impl MessageSink for RecordingSink {
    fn send(
        &self,
        topic: &str,
        body: &[u8],
        headers: &[(&str, &str)],
    ) -> Result<(), TransportError> {
        self.sent.lock().expect("sink poisoned").push(SentMessage {
            topic: topic.to_string(),
            body: body.to_vec(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
        Ok(())
    }
}

/// Sink that rejects every send.
#[derive(Debug, Default)]
pub struct FailingSink;

impl MessageSink for FailingSink {
    fn send(&self, _: &str, _: &[u8], _: &[(&str, &str)]) -> Result<(), TransportError> {
        Err(TransportError::Send("broker unavailable".to_string()))
    }
}

/// Registry that always hands out the same run id.
pub struct FixedRegistry {
    id: u64,
    heartbeats: AtomicU64,
}

impl FixedRegistry {
    /// Registry answering with `id`.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            heartbeats: AtomicU64::new(0),
        }
    }

    /// Number of heartbeats received.
    pub fn heartbeats(&self) -> u64 {
        self.heartbeats.load(Ordering::Acquire)
    }
}

#[async_trait]
impl RunRegistry for FixedRegistry {
    async fn next_run_id(&self) -> Result<RunId, RegistryError> {
        Ok(RunId(self.id))
    }

    async fn heartbeat(&self, _status: &str) -> Result<(), RegistryError> {
        self.heartbeats.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}

/// Registry that fails every request.
#[derive(Debug, Default)]
pub struct FailingRegistry;

#[async_trait]
impl RunRegistry for FailingRegistry {
    async fn next_run_id(&self) -> Result<RunId, RegistryError> {
        Err(RegistryError::Request("monitor unreachable".to_string()))
    }

    async fn heartbeat(&self, _status: &str) -> Result<(), RegistryError> {
        Err(RegistryError::Request("monitor unreachable".to_string()))
    }
}

/// Schedule with a single segment of the given length.
pub fn single_segment(state: &str, substate: &str, seconds: u64) -> Schedule {
    phases(&[(state, substate, seconds)])
}

/// Schedule built from `(state, substate, seconds)` phases.
pub fn phases(phases: &[(&str, &str, u64)]) -> Schedule {
    let entries = phases
        .iter()
        .map(|(state, substate, seconds)| ScheduleEntry {
            state: state.to_string(),
            substate: substate.to_string(),
            span: format!("0,0,0,0,{}", seconds),
        })
        .collect();
    Schedule::from_entries(entries).expect("fixture schedule is valid")
}
