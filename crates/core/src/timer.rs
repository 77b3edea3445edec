//! Countdown timer
//!
//! The remaining time is always derived from an absolute deadline compared
//! against the clock, never from a decremented counter, so late or missed ticks
//! cannot drift the countdown. The host calls [`Countdown::tick`] as often as it
//! likes and renders [`Countdown::snapshot`].

use std::cell::Cell;

use chrono::Utc;
use serde::Serialize;

use crate::error::{Error, Result};

pub const DEFAULT_DURATION_SECS: u32 = 10 * 60;
pub const MIN_SECONDS: u32 = 10;
pub const MAX_SECONDS: u32 = 3600;
pub const MIN_MINUTES: u32 = 1;
pub const MAX_MINUTES: u32 = 60;

/// Suggested interval between host ticks
pub const TICK_INTERVAL_MS: u64 = 200;

/// Source of wall-clock milliseconds
pub trait Clock {
    fn now_ms(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Hand-driven clock for tests
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<i64>,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn advance(&self, ms: i64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: i64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> i64 {
        (**self).now_ms()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// Full duration remaining, not started
    Idle,
    Running { deadline_ms: i64 },
    Paused { remaining_ms: i64 },
    /// Reached zero; the alert has been raised
    Finished,
}

/// Emitted by [`Countdown::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// The countdown just reached zero. Emitted exactly once per run.
    Finished,
}

/// Render-ready view of the timer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerSnapshot {
    pub remaining_ms: i64,
    pub display: String,
    /// Fraction of the duration still remaining, 0.0 to 1.0
    pub progress: f64,
    pub running: bool,
    pub finished: bool,
}

#[derive(Debug, Clone)]
pub struct Countdown {
    duration_secs: u32,
    state: TimerState,
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION_SECS)
    }
}

impl Countdown {
    pub fn new(duration_secs: u32) -> Self {
        Self {
            duration_secs: duration_secs.clamp(MIN_SECONDS, MAX_SECONDS),
            state: TimerState::Idle,
        }
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    pub fn duration_ms(&self) -> i64 {
        i64::from(self.duration_secs) * 1000
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, TimerState::Running { .. })
    }

    /// Start or resume. A finished timer starts over from the full duration.
    pub fn start(&mut self, now_ms: i64) {
        let remaining = match self.state {
            TimerState::Running { .. } => return,
            TimerState::Idle | TimerState::Finished => self.duration_ms(),
            TimerState::Paused { remaining_ms } => remaining_ms,
        };
        self.state = TimerState::Running {
            deadline_ms: now_ms + remaining,
        };
        tracing::debug!(remaining_ms = remaining, "Timer started");
    }

    /// Freeze the remaining time. No-op unless running.
    ///
    /// A timer already past its deadline stays running so the next tick still
    /// reports [`TimerEvent::Finished`].
    pub fn pause(&mut self, now_ms: i64) {
        if let TimerState::Running { deadline_ms } = self.state {
            if deadline_ms > now_ms {
                self.state = TimerState::Paused {
                    remaining_ms: deadline_ms - now_ms,
                };
            }
        }
    }

    /// Back to the full duration, stopped. Safe to call in any state.
    pub fn reset(&mut self) {
        self.state = TimerState::Idle;
    }

    /// Advance the state machine to `now_ms`
    pub fn tick(&mut self, now_ms: i64) -> Option<TimerEvent> {
        match self.state {
            TimerState::Running { deadline_ms } if now_ms >= deadline_ms => {
                self.state = TimerState::Finished;
                tracing::info!("Countdown finished");
                Some(TimerEvent::Finished)
            }
            _ => None,
        }
    }

    pub fn remaining_ms(&self, now_ms: i64) -> i64 {
        match self.state {
            TimerState::Idle => self.duration_ms(),
            TimerState::Running { deadline_ms } => (deadline_ms - now_ms).max(0),
            TimerState::Paused { remaining_ms } => remaining_ms,
            TimerState::Finished => 0,
        }
    }

    pub fn progress(&self, now_ms: i64) -> f64 {
        let duration = self.duration_ms();
        if duration <= 0 {
            return 0.0;
        }
        (self.remaining_ms(now_ms) as f64 / duration as f64).clamp(0.0, 1.0)
    }

    pub fn snapshot(&self, now_ms: i64) -> TimerSnapshot {
        let remaining_ms = self.remaining_ms(now_ms);
        TimerSnapshot {
            remaining_ms,
            display: format_remaining(remaining_ms),
            progress: self.progress(now_ms),
            running: self.is_running(),
            finished: remaining_ms <= 0,
        }
    }

    /// Set the duration in whole minutes (1 to 60)
    pub fn set_minutes(&mut self, minutes: u32) -> Result<()> {
        self.set_seconds(minutes.clamp(MIN_MINUTES, MAX_MINUTES) * 60)
    }

    /// Set the duration in seconds (10 to 3600). Stops and rewinds the timer.
    pub fn set_seconds(&mut self, seconds: u32) -> Result<()> {
        if self.is_running() {
            return Err(Error::validation(
                "Pause the timer before changing its duration.",
            ));
        }
        self.duration_secs = seconds.clamp(MIN_SECONDS, MAX_SECONDS);
        self.state = TimerState::Idle;
        Ok(())
    }

    /// Short-press adjustment: a minute per step above one minute, otherwise
    /// five seconds.
    pub fn adjust_step(&mut self, delta: i32) -> Result<()> {
        let step = if self.duration_secs > 60 { 60 } else { 5 };
        self.adjust_by(delta * step)
    }

    /// Long-press adjustment: five minutes per step above one minute, otherwise
    /// five seconds.
    pub fn adjust_step_long(&mut self, delta: i32) -> Result<()> {
        let step = if self.duration_secs > 60 { 300 } else { 5 };
        self.adjust_by(delta * step)
    }

    fn adjust_by(&mut self, seconds: i32) -> Result<()> {
        let target = (i64::from(self.duration_secs) + i64::from(seconds))
            .clamp(i64::from(MIN_SECONDS), i64::from(MAX_SECONDS));
        self.set_seconds(target as u32)
    }
}

/// `MM:SS`, rounding partial seconds up so "00:00" only shows at zero
pub fn format_remaining(ms: i64) -> String {
    let total_seconds = ((ms.max(0) + 999) / 1000) as u64;
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}
