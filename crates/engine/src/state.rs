//! Shared run state.

use arc_swap::ArcSwap;
use daqsim_schedule::Schedule;
use daqsim_types::RunId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Position in the schedule: one atomically-replaced tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatePoint {
    /// Index of the active segment.
    pub index: usize,
    /// State name of the active segment.
    pub state: String,
    /// Substate name of the active segment.
    pub substate: String,
}

/// The engine's current schedule position.
///
/// Written solely by the state tracker, read solely by the STF generator.
/// Readers get a consistent `(index, state, substate)` snapshot; they are
/// not synchronized against the tracker's tick, which is the documented
/// labeling race at breakpoints.
pub struct EngineState {
    current: ArcSwap<StatePoint>,
}

impl EngineState {
    /// State positioned at the first segment of the schedule.
    pub fn new(schedule: &Schedule) -> Self {
        let first = schedule.segment(0);
        Self {
            current: ArcSwap::from_pointee(StatePoint {
                index: 0,
                state: first.state.clone(),
                substate: first.substate.clone(),
            }),
        }
    }

    /// Consistent snapshot of the current position.
    pub fn snapshot(&self) -> Arc<StatePoint> {
        self.current.load_full()
    }

    /// Replace the position. Tracker only.
    pub fn replace(&self, point: StatePoint) {
        self.current.store(Arc::new(point));
    }
}

/// Per-run bookkeeping, created once the run id is known.
pub struct RunContext {
    /// Identifier of this run.
    pub run_id: RunId,
    /// Dataset all artifacts of this run belong to.
    pub dataset: String,
    /// Run start, fourteen-digit wall-clock form.
    pub started_at: String,
    stf_count: AtomicU64,
}

impl RunContext {
    /// Fresh context with a zero STF count.
    pub fn new(run_id: RunId, started_at: String) -> Self {
        Self {
            run_id,
            dataset: run_id.dataset(),
            started_at,
            stf_count: AtomicU64::new(0),
        }
    }

    /// Number of STFs generated so far. Doubles as the next sequence number.
    pub fn stf_count(&self) -> u64 {
        self.stf_count.load(Ordering::Acquire)
    }

    /// Record one generated STF.
    ///
    /// Only the generator task calls this, so sequence numbers are unique
    /// by construction.
    pub fn record_stf(&self) {
        self.stf_count.fetch_add(1, Ordering::AcqRel);
    }
}
