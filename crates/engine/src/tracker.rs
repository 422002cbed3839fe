//! State tracker task.

use crate::clock::{Tick, VirtualClock};
use crate::state::{EngineState, StatePoint};
use daqsim_schedule::Schedule;
use std::sync::Arc;
use tracing::debug;

/// Re-evaluate the schedule position once per clock tick.
///
/// Looks up the segment whose breakpoint interval contains `floor(now)`;
/// on a change, replaces the shared tuple in one swap. Past the last
/// breakpoint the lookup lands out of range and the state stays frozen at
/// the final segment. Runs until the clock halts.
pub(crate) async fn track_schedule(
    clock: VirtualClock,
    schedule: Arc<Schedule>,
    state: Arc<EngineState>,
    tick: f64,
) {
    loop {
        let index = schedule.segment_index_at(clock.now().floor());
        if index < schedule.len() && index != state.snapshot().index {
            let segment = schedule.segment(index);
            debug!(
                index,
                state = %segment.state,
                substate = %segment.substate,
                "Schedule transition"
            );
            state.replace(StatePoint {
                index,
                state: segment.state.clone(),
                substate: segment.substate.clone(),
            });
        }

        if clock.timeout(tick).await == Tick::Halted {
            break;
        }
    }
}
