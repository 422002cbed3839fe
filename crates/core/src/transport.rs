//! Message transport capability.

use thiserror::Error;

/// Errors surfaced by a message transport.
///
/// Send failures are never fatal to a run: the simulation's ground truth
/// is the local artifact stream, not delivery acknowledgement.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport is not connected to its broker.
    #[error("Transport not connected: {0}")]
    Connection(String),

    /// A send was attempted and rejected.
    #[error("Transport send failed: {0}")]
    Send(String),
}

/// Capability to publish an event to external consumers.
///
/// Implementations wrap whatever broker the deployment uses; the engine
/// only ever calls `send`. Headers are passed through verbatim.
pub trait MessageSink: Send + Sync {
    /// Publish `body` on `topic` with the given headers.
    fn send(&self, topic: &str, body: &[u8], headers: &[(&str, &str)]) -> Result<(), TransportError>;
}
