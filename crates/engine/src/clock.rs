//! Real-time paced virtual clock.
//!
//! Logical time starts at zero and advances at `1 / factor` times the
//! wall clock: factor 1.0 runs in real time, factor 0.1 runs ten times
//! faster. Built on `tokio::time`, so tests under
//! `#[tokio::test(start_paused = true)]` run instantly and
//! deterministically.

use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{sleep_until, Duration, Instant};

/// Result of one suspension on the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The requested logical interval elapsed.
    Elapsed,
    /// The clock stopped (horizon reached or halted) before the interval.
    Halted,
}

/// How the clock's run loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockOutcome {
    /// Logical time reached the configured horizon.
    HorizonReached,
    /// The clock was halted early (operator cancellation).
    Interrupted,
}

struct ClockInner {
    origin: Instant,
    factor: f64,
    until: f64,
    halt_tx: watch::Sender<bool>,
}

/// Shared virtual clock pacing all simulation tasks.
///
/// Cheap to clone; all clones observe the same time and the same halt.
#[derive(Clone)]
pub struct VirtualClock {
    inner: Arc<ClockInner>,
}

impl VirtualClock {
    /// Create a clock with the given real-time factor and logical horizon.
    ///
    /// `factor` must be finite and positive, `until` finite and
    /// non-negative; both are validated by [`crate::DaqConfig`].
    pub fn new(factor: f64, until: f64) -> Self {
        let (halt_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(ClockInner {
                origin: Instant::now(),
                factor,
                until,
                halt_tx,
            }),
        }
    }

    /// Current logical time in seconds. Monotonic, starts at 0.
    pub fn now(&self) -> f64 {
        self.inner.origin.elapsed().as_secs_f64() / self.inner.factor
    }

    /// The logical horizon.
    pub fn horizon(&self) -> f64 {
        self.inner.until
    }

    /// Whether the clock has stopped scheduling wake-ups.
    pub fn is_halted(&self) -> bool {
        *self.inner.halt_tx.borrow()
    }

    /// Stop the clock. Idempotent; wakes every pending waiter.
    pub fn halt(&self) {
        self.inner.halt_tx.send_replace(true);
    }

    fn wall_deadline(&self, logical: f64) -> Instant {
        self.inner.origin + Duration::from_secs_f64(logical * self.inner.factor)
    }

    /// Suspend the caller for `dt` logical seconds.
    ///
    /// Never returns [`Tick::Elapsed`] before `dt` logical seconds have
    /// passed. Returns [`Tick::Halted`] instead if the wake-up would land
    /// at or past the horizon, or if the clock is halted while waiting.
    pub async fn timeout(&self, dt: f64) -> Tick {
        let mut halt_rx = self.inner.halt_tx.subscribe();
        if *halt_rx.borrow() {
            return Tick::Halted;
        }

        let target = self.now() + dt.max(0.0);
        let deadline = self.wall_deadline(target.min(self.inner.until));

        tokio::select! {
            biased;
            _ = halt_rx.wait_for(|halted| *halted) => Tick::Halted,
            _ = sleep_until(deadline) => {
                if target >= self.inner.until {
                    Tick::Halted
                } else {
                    Tick::Elapsed
                }
            }
        }
    }

    /// Wait until the horizon is reached or the clock is halted.
    ///
    /// Either way the clock is halted on return, so no task schedules a
    /// wake-up afterwards. Halting while waiting is reported as the
    /// distinguished [`ClockOutcome::Interrupted`].
    pub async fn run_until_horizon(&self) -> ClockOutcome {
        let mut halt_rx = self.inner.halt_tx.subscribe();
        let deadline = self.wall_deadline(self.inner.until);

        let outcome = tokio::select! {
            biased;
            _ = halt_rx.wait_for(|halted| *halted) => ClockOutcome::Interrupted,
            _ = sleep_until(deadline) => ClockOutcome::HorizonReached,
        };
        self.halt();
        outcome
    }
}
