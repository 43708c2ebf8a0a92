//! Countdown against the attempt deadline
//!
//! The controller stores only the absolute deadline and derives remaining
//! time from the wall clock on every tick. Nothing here accumulates, so a
//! host process that gets suspended and resumed picks up with the correct
//! remaining time on its next tick, and a reloaded session recomputes it
//! from the persisted deadline.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use web_time::SystemTime;

/// Phase of the countdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Created but not started
    #[default]
    Idle,
    /// Ticking against the deadline
    Running,
    /// Deadline reached; the expiry signal has fired
    Expired,
}

/// Result of processing one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    /// Remaining time at the tick, zero once the deadline has passed
    pub remaining: Duration,
    /// Set on exactly the first tick that observes zero remaining time
    pub expired: bool,
}

/// Alarm scheduled for the next tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// Cadence tick; the engine reschedules it while the countdown runs
    Tick,
}

/// Countdown updates sent to the host UI
#[serde_with::serde_as]
#[derive(Debug, Serialize, Clone)]
pub enum UpdateMessage {
    /// Remaining time for the header clock
    TimeRemaining {
        /// Time left until the deadline
        #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
        remaining: Duration,
    },
    /// The deadline has been reached
    Expired,
}

/// Derives a monotonically non-increasing remaining time from a fixed
/// deadline and fires exactly one expiry signal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Countdown {
    /// Absolute deadline of the attempt
    deadline_at: SystemTime,
    /// Current phase
    phase: Phase,
}

impl Countdown {
    /// Creates an idle countdown against the given deadline
    pub fn new(deadline_at: SystemTime) -> Self {
        Self {
            deadline_at,
            phase: Phase::Idle,
        }
    }

    /// The absolute deadline this countdown runs against
    pub fn deadline_at(&self) -> SystemTime {
        self.deadline_at
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Remaining time at `now`, clamped to zero past the deadline
    pub fn remaining(&self, now: SystemTime) -> Duration {
        self.deadline_at.duration_since(now).unwrap_or_default()
    }

    /// Enters the running phase
    ///
    /// Returns `true` only on the transition out of `Idle`; starting an
    /// already running or expired countdown has no effect.
    pub fn start(&mut self) -> bool {
        if self.phase == Phase::Idle {
            self.phase = Phase::Running;
            true
        } else {
            false
        }
    }

    /// Processes one tick at `now`
    ///
    /// Returns `None` unless the countdown is running. The first tick that
    /// observes zero remaining time moves the phase to `Expired` and sets
    /// `expired` in the outcome; every later tick is suppressed, so the
    /// expiry signal cannot fire twice even if the host keeps delivering
    /// tick alarms.
    pub fn tick(&mut self, now: SystemTime) -> Option<TickOutcome> {
        if self.phase != Phase::Running {
            return None;
        }
        let remaining = self.remaining(now);
        let expired = remaining.is_zero();
        if expired {
            self.phase = Phase::Expired;
        }
        Some(TickOutcome { remaining, expired })
    }
}
