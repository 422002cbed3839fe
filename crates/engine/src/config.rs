//! Engine configuration.

use crate::RunError;
use daqsim_messages::RunConditions;
use daqsim_schedule::Schedule;
use std::path::PathBuf;

/// Configuration for one simulation run.
///
/// Everything the engine needs is passed in here explicitly; there is no
/// ambient environment-derived state.
#[derive(Debug, Clone)]
pub struct DaqConfig {
    /// The operational schedule to walk.
    pub schedule: Schedule,

    /// Root folder for output data. `None` disables persistence.
    pub destination: Option<PathBuf>,

    /// Stop the run at this logical time. Defaults to the schedule horizon.
    pub until: Option<f64>,

    /// State-tracker period in logical seconds.
    pub clock_tick: f64,

    /// Wall-clock seconds per logical second. 1.0 is real time,
    /// smaller values accelerate the run.
    pub factor: f64,

    /// Lower bound on the STF interarrival time, seconds.
    pub low: f64,

    /// Upper bound on the STF interarrival time, seconds.
    pub high: f64,

    /// Seed for the interarrival draw. `None` seeds from entropy.
    pub seed: Option<u64>,

    /// Conditions announced with the `run_imminent` event.
    pub run_conditions: RunConditions,
}

impl DaqConfig {
    /// Configuration with the original simulator's defaults.
    pub fn new(schedule: Schedule) -> Self {
        Self {
            schedule,
            destination: None,
            until: None,
            clock_tick: 1.0,
            factor: 1.0,
            low: 1.0,
            high: 2.0,
            seed: None,
            run_conditions: RunConditions::default(),
        }
    }

    /// Set the output destination root.
    pub fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// Stop the run at the given logical time instead of the schedule horizon.
    pub fn with_until(mut self, until: f64) -> Self {
        self.until = Some(until);
        self
    }

    /// Set the state-tracker period.
    pub fn with_clock_tick(mut self, clock_tick: f64) -> Self {
        self.clock_tick = clock_tick;
        self
    }

    /// Set the real-time factor.
    pub fn with_factor(mut self, factor: f64) -> Self {
        self.factor = factor;
        self
    }

    /// Set the interarrival bounds.
    pub fn with_interarrival(mut self, low: f64, high: f64) -> Self {
        self.low = low;
        self.high = high;
        self
    }

    /// Seed the interarrival draw for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the announced run conditions.
    pub fn with_run_conditions(mut self, run_conditions: RunConditions) -> Self {
        self.run_conditions = run_conditions;
        self
    }

    /// The logical time the run stops at.
    pub fn effective_until(&self) -> f64 {
        self.until.unwrap_or_else(|| self.schedule.horizon())
    }

    /// Validate numeric parameters.
    pub fn validate(&self) -> Result<(), RunError> {
        if !(self.factor.is_finite() && self.factor > 0.0) {
            return Err(RunError::Config(format!(
                "factor must be finite and positive, got {}",
                self.factor
            )));
        }
        if !(self.clock_tick.is_finite() && self.clock_tick > 0.0) {
            return Err(RunError::Config(format!(
                "clock tick must be finite and positive, got {}",
                self.clock_tick
            )));
        }
        if !(self.low.is_finite() && self.high.is_finite() && 0.0 <= self.low) {
            return Err(RunError::Config(format!(
                "interarrival bounds must be finite and non-negative, got [{}, {}]",
                self.low, self.high
            )));
        }
        if self.low > self.high {
            return Err(RunError::Config(format!(
                "interarrival low {} exceeds high {}",
                self.low, self.high
            )));
        }
        if let Some(until) = self.until {
            if !(until.is_finite() && until >= 0.0) {
                return Err(RunError::Config(format!(
                    "until must be finite and non-negative, got {}",
                    until
                )));
            }
        }
        Ok(())
    }
}
