//! Run lifecycle controller.

use crate::clock::{ClockOutcome, VirtualClock};
use crate::config::DaqConfig;
use crate::error::RunError;
use crate::generator::StfGenerator;
use crate::state::{EngineState, RunContext};
use crate::tracker::track_schedule;
use daqsim_core::{MessageSink, RunRegistry};
use daqsim_messages::{Event, EVENT_TOPIC, PERSISTENT_HEADERS};
use daqsim_types::{now_compact, RunId};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Lifecycle phase of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// No run id acquired yet.
    Idle,
    /// Run id acquired and announced, clock not started.
    RunImminent,
    /// Clock and tasks running.
    Running,
    /// Terminal.
    Ended,
}

/// How a completed run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The clock reached its horizon.
    HorizonReached,
    /// The operator cancelled the run.
    Interrupted,
}

/// Final report of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// The run's identifier.
    pub run_id: RunId,
    /// Dataset the run wrote into.
    pub dataset: String,
    /// Total STFs generated.
    pub stf_count: u64,
    /// Logical time at the end of the run.
    pub sim_time: f64,
    /// How the run stopped.
    pub outcome: RunOutcome,
}

/// Drives one simulation run through its lifecycle:
/// `Idle -> RunImminent -> Running -> Ended`.
pub struct DaqRunner {
    config: DaqConfig,
    registry: Arc<dyn RunRegistry>,
    sink: Option<Arc<dyn MessageSink>>,
    phase: RunPhase,
    folder: Option<PathBuf>,
}

impl DaqRunner {
    /// Create a runner for one run. Validates the configuration.
    pub fn new(
        config: DaqConfig,
        registry: Arc<dyn RunRegistry>,
        sink: Option<Arc<dyn MessageSink>>,
    ) -> Result<Self, RunError> {
        config.validate()?;
        Ok(Self {
            config,
            registry,
            sink,
            phase: RunPhase::Idle,
            folder: None,
        })
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Execute the run to completion.
    ///
    /// `shutdown` is the operator-cancellation signal (typically ctrl-c);
    /// when it resolves, the clock halts and the run ends with
    /// [`RunOutcome::Interrupted`] within one tick. Registry or output
    /// directory failures abort before anything starts; a persistence
    /// failure aborts the run in progress.
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) -> Result<RunSummary, RunError> {
        let context = self.start_run().await?;

        // RunImminent -> Running: start the clock and both tasks.
        let clock = VirtualClock::new(self.config.factor, self.config.effective_until());
        let schedule = Arc::new(self.config.schedule.clone());
        let state = Arc::new(EngineState::new(&schedule));

        let tracker = tokio::spawn(track_schedule(
            clock.clone(),
            schedule,
            state.clone(),
            self.config.clock_tick,
        ));
        let generator = StfGenerator::new(
            clock.clone(),
            state,
            context.clone(),
            self.sink.clone(),
            self.folder.clone(),
            self.config.low,
            self.config.high,
            self.config.seed,
        );
        let generator_task = tokio::spawn(generator.run());

        self.phase = RunPhase::Running;
        self.emit(&Event::start_run(context.run_id, now_compact()));
        self.heartbeat("OK").await;
        info!(
            run_id = %context.run_id,
            until = clock.horizon(),
            factor = self.config.factor,
            "Run started"
        );

        tokio::pin!(shutdown);
        let outcome = tokio::select! {
            outcome = clock.run_until_horizon() => match outcome {
                ClockOutcome::HorizonReached => RunOutcome::HorizonReached,
                ClockOutcome::Interrupted => RunOutcome::Interrupted,
            },
            _ = &mut shutdown => {
                info!("Operator cancellation received");
                clock.halt();
                RunOutcome::Interrupted
            }
        };

        // The clock is halted; let the generator finish any in-flight
        // write, then surface a mid-run persistence failure.
        match generator_task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracker.abort();
                return Err(e);
            }
            Err(e) => {
                tracker.abort();
                return Err(RunError::Task(e.to_string()));
            }
        }
        let _ = tracker.await;

        let sim_time = clock.now().min(clock.horizon());
        Ok(self.end_run(&context, outcome, sim_time).await)
    }

    /// `Idle -> RunImminent`: acquire the run id, prepare the output
    /// folder, announce the run.
    async fn start_run(&mut self) -> Result<Arc<RunContext>, RunError> {
        let run_id = self.registry.next_run_id().await?;
        let context = Arc::new(RunContext::new(run_id, now_compact()));
        info!(run_id = %run_id, dataset = %context.dataset, "Run imminent");

        if let Some(destination) = &self.config.destination {
            let folder = destination.join(&context.dataset);
            std::fs::create_dir_all(&folder).map_err(|source| RunError::CreateDir {
                path: folder.clone(),
                source,
            })?;
            debug!(folder = %folder.display(), "Created output folder");
            self.folder = Some(folder);
        }

        self.phase = RunPhase::RunImminent;
        self.emit(&Event::run_imminent(
            run_id,
            context.started_at.clone(),
            context.dataset.clone(),
            self.config.run_conditions.clone(),
        ));
        Ok(context)
    }

    /// `-> Ended`: idempotent; a second trigger emits nothing.
    async fn end_run(
        &mut self,
        context: &RunContext,
        outcome: RunOutcome,
        sim_time: f64,
    ) -> RunSummary {
        if self.phase != RunPhase::Ended {
            self.phase = RunPhase::Ended;
            self.emit(&Event::end_run(context.run_id, now_compact()));
            self.heartbeat("OK").await;
            info!(
                run_id = %context.run_id,
                stf_count = context.stf_count(),
                sim_time,
                ?outcome,
                "Run ended"
            );
        }

        RunSummary {
            run_id: context.run_id,
            dataset: context.dataset.clone(),
            stf_count: context.stf_count(),
            sim_time,
            outcome,
        }
    }

    fn emit(&self, event: &Event) {
        if let Some(sink) = &self.sink {
            if let Err(e) = sink.send(EVENT_TOPIC, &event.to_json(), &PERSISTENT_HEADERS) {
                warn!(error = %e, "Failed to publish event");
            }
        }
    }

    async fn heartbeat(&self, status: &str) {
        if let Err(e) = self.registry.heartbeat(status).await {
            warn!(error = %e, "Heartbeat failed");
        }
    }
}
