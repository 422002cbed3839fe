//! STF generator task.

use crate::clock::{Tick, VirtualClock};
use crate::error::RunError;
use crate::state::{EngineState, RunContext};
use chrono::{Duration as ChronoDuration, Local};
use daqsim_core::MessageSink;
use daqsim_messages::{Event, StfMetadata, EVENT_TOPIC, PERSISTENT_HEADERS};
use daqsim_types::{file_checksum, format_compact_micros};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Checksum value reported when no file was written.
const UNWRITTEN_CHECKSUM: u32 = 0;

/// Generates STFs at randomized intervals until the clock halts.
pub(crate) struct StfGenerator {
    clock: VirtualClock,
    state: Arc<EngineState>,
    context: Arc<RunContext>,
    sink: Option<Arc<dyn MessageSink>>,
    /// Per-run output folder; `None` disables persistence.
    folder: Option<PathBuf>,
    low: f64,
    high: f64,
    rng: ChaCha8Rng,
}

impl StfGenerator {
    pub(crate) fn new(
        clock: VirtualClock,
        state: Arc<EngineState>,
        context: Arc<RunContext>,
        sink: Option<Arc<dyn MessageSink>>,
        folder: Option<PathBuf>,
        low: f64,
        high: f64,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            clock,
            state,
            context,
            sink,
            folder,
            low,
            high,
            rng,
        }
    }

    /// Run the generation loop.
    ///
    /// Returns `Ok(())` when the clock halts. A persistence failure is
    /// fatal: the clock is halted so the run loop returns promptly, and
    /// the error surfaces to the runner.
    pub(crate) async fn run(mut self) -> Result<(), RunError> {
        loop {
            let interarrival = match self.fire() {
                Ok(interarrival) => interarrival,
                Err(e) => {
                    self.clock.halt();
                    return Err(e);
                }
            };
            if self.clock.timeout(interarrival).await == Tick::Halted {
                return Ok(());
            }
        }
    }

    /// Build, persist, count, and announce one STF.
    ///
    /// Returns the interarrival drawn for this firing; the caller
    /// suspends for that long before the next one.
    fn fire(&mut self) -> Result<f64, RunError> {
        let interarrival = self.draw_interarrival();

        let sequence = self.context.stf_count();
        let filename = self.context.run_id.stf_filename(sequence);

        let build_start = Local::now();
        let build_end = build_start + ChronoDuration::microseconds((interarrival * 1e6) as i64);

        // Snapshot the schedule position; not synchronized against the
        // tracker's tick (see the crate docs on the labeling race).
        let position = self.state.snapshot();

        let metadata = StfMetadata {
            run_id: self.context.run_id,
            state: position.state.clone(),
            substate: position.substate.clone(),
            filename,
            start: format_compact_micros(build_start),
            end: format_compact_micros(build_end),
        };

        let (checksum, size) = match &self.folder {
            Some(folder) => self.persist(folder.clone(), &metadata)?,
            None => (UNWRITTEN_CHECKSUM, 0),
        };

        self.context.record_stf();

        if let Some(sink) = &self.sink {
            let event = Event::stf_gen(metadata, format!("ad:{}", checksum), size);
            if let Err(e) = sink.send(EVENT_TOPIC, &event.to_json(), &PERSISTENT_HEADERS) {
                // Non-fatal: the artifact stream is the ground truth.
                warn!(error = %e, "Failed to publish stf_gen event");
            }
        }

        Ok(interarrival)
    }

    /// Write the metadata body and digest the file it produced.
    ///
    /// The checksum is computed from the bytes on disk after the write
    /// completes, so it reflects exactly what was written.
    fn persist(&self, folder: PathBuf, metadata: &StfMetadata) -> Result<(u32, u64), RunError> {
        let path = folder.join(&metadata.filename);
        std::fs::write(&path, metadata.to_json()).map_err(|source| RunError::Persistence {
            path: path.clone(),
            source,
        })?;

        let checksum = file_checksum(&path).map_err(|source| RunError::Persistence {
            path: path.clone(),
            source,
        })?;
        let size = std::fs::metadata(&path)
            .map_err(|source| RunError::Persistence {
                path: path.clone(),
                source,
            })?
            .len();

        debug!(path = %path.display(), checksum, size, "Wrote STF");
        Ok((checksum, size))
    }

    fn draw_interarrival(&mut self) -> f64 {
        // gen_range panics on an empty range; equal bounds are the
        // deterministic case.
        if self.low >= self.high {
            self.low
        } else {
            self.rng.gen_range(self.low..self.high)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daqsim_schedule::{Schedule, ScheduleEntry};
    use daqsim_test_helpers::RecordingSink;
    use daqsim_types::{Adler32, RunId};

    fn physics_schedule() -> Schedule {
        Schedule::from_entries(vec![ScheduleEntry {
            state: "RUN".into(),
            substate: "PHYSICS".into(),
            span: "0,0,0,0,10".into(),
        }])
        .unwrap()
    }

    fn generator(
        sink: Option<Arc<dyn MessageSink>>,
        folder: Option<PathBuf>,
        low: f64,
        high: f64,
    ) -> StfGenerator {
        let schedule = physics_schedule();
        StfGenerator::new(
            VirtualClock::new(1.0, 10.0),
            Arc::new(EngineState::new(&schedule)),
            Arc::new(RunContext::new(RunId(7), "20250101000000".into())),
            sink,
            folder,
            low,
            high,
            Some(42),
        )
    }

    #[test]
    fn test_fire_counts_and_labels() {
        let sink = Arc::new(RecordingSink::new());
        let mut generator = generator(Some(sink.clone()), None, 2.0, 2.0);

        for _ in 0..3 {
            let interarrival = generator.fire().unwrap();
            assert_eq!(interarrival, 2.0);
        }

        assert_eq!(generator.context.stf_count(), 3);
        let events = sink.events();
        assert_eq!(events.len(), 3);
        for (i, event) in events.iter().enumerate() {
            match event {
                Event::StfGen {
                    run_id,
                    state,
                    substate,
                    filename,
                    checksum,
                    size,
                    ..
                } => {
                    assert_eq!(*run_id, RunId(7));
                    assert_eq!(state, "RUN");
                    assert_eq!(substate, "PHYSICS");
                    assert_eq!(*filename, RunId(7).stf_filename(i as u64));
                    assert_eq!(checksum, "ad:0");
                    assert_eq!(*size, 0);
                }
                other => panic!("unexpected event {:?}", other),
            }
        }
    }

    #[test]
    fn test_fire_persists_and_checksums() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(RecordingSink::new());
        let mut generator = generator(
            Some(sink.clone()),
            Some(dir.path().to_path_buf()),
            1.0,
            1.0,
        );

        generator.fire().unwrap();

        let path = dir.path().join("run.000007.000000.stf");
        let body = std::fs::read(&path).unwrap();
        let expected = Adler32::digest(&body);

        match &sink.events()[0] {
            Event::StfGen { checksum, size, .. } => {
                assert_eq!(*checksum, format!("ad:{}", expected));
                assert_eq!(*size, body.len() as u64);
            }
            other => panic!("unexpected event {:?}", other),
        }

        // File body is the pre-checksum metadata.
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["filename"], "run.000007.000000.stf");
        assert_eq!(value["state"], "RUN");
        assert!(value.get("checksum").is_none());
    }

    #[test]
    fn test_fire_fails_on_unwritable_folder() {
        let mut generator = generator(None, Some(PathBuf::from("/nonexistent/folder")), 1.0, 1.0);
        match generator.fire() {
            Err(RunError::Persistence { .. }) => {}
            other => panic!("expected persistence error, got {:?}", other),
        }
        // The failed artifact was never counted.
        assert_eq!(generator.context.stf_count(), 0);
    }

    #[test]
    fn test_seeded_draws_are_reproducible() {
        let mut a = generator(None, None, 1.0, 2.0);
        let mut b = generator(None, None, 1.0, 2.0);
        for _ in 0..10 {
            let draw = a.draw_interarrival();
            assert_eq!(draw, b.draw_interarrival());
            assert!((1.0..2.0).contains(&draw));
        }
    }
}
