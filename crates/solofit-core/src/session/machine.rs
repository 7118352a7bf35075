//! Phase bookkeeping shared by workout and evaluation sessions.
//!
//! The machine owns the current [`Phase`] and the single [`Countdown`].
//! Entering a phase always retires the running countdown before the new
//! phase is installed.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::countdown::{Countdown, TickOutcome, TimerId};
use super::phase::Phase;
use crate::error::SessionError;
use crate::events::Event;

/// Countdown lengths in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    pub warmup_secs: u32,
    pub rest_secs: u32,
    /// Length of one evaluation interval.
    pub exercise_secs: u32,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            warmup_secs: 300,
            rest_secs: 60,
            exercise_secs: 300,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PhaseMachine {
    phase: Phase,
    countdown: Countdown,
    transitions: u32,
}

impl PhaseMachine {
    /// Begin in `WarmUp` with its countdown armed.
    pub(crate) fn warm_up(secs: u32) -> Self {
        let mut countdown = Countdown::new();
        countdown.arm(secs);
        debug!(secs, "warm-up started");
        Self {
            phase: Phase::WarmUp,
            countdown,
            transitions: 0,
        }
    }

    pub(crate) fn phase(&self) -> &Phase {
        &self.phase
    }

    pub(crate) fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub(crate) fn transitions(&self) -> u32 {
        self.transitions
    }

    /// Move to `next`, arming a countdown of `timer_secs` if given.
    pub(crate) fn enter(&mut self, next: Phase, timer_secs: Option<u32>) -> Event {
        self.countdown.cancel();
        let from = self.phase.kind();
        let to = next.kind();
        debug_assert!(
            from.can_transition_to(to),
            "illegal phase transition {from:?} -> {to:?}"
        );
        if let Some(secs) = timer_secs {
            self.countdown.arm(secs);
        }
        info!(?from, ?to, timer_secs, "phase changed");
        self.phase = next.clone();
        self.transitions += 1;
        Event::PhaseChanged {
            from,
            to: next,
            timer_secs,
            at: Utc::now(),
        }
    }

    /// Retire the running countdown; the caller then runs the expiry path.
    pub(crate) fn cancel_timer(&mut self) -> bool {
        self.countdown.cancel()
    }

    pub(crate) fn tick(&mut self, id: TimerId) -> TickOutcome {
        self.countdown.tick(id)
    }

    pub(crate) fn pause(&mut self) -> Option<Event> {
        if !self.countdown.pause() {
            return None;
        }
        debug!(remaining = self.countdown.remaining_secs(), "timer paused");
        Some(Event::TimerPaused {
            remaining_secs: self.countdown.remaining_secs(),
            at: Utc::now(),
        })
    }

    pub(crate) fn resume(&mut self) -> Option<Event> {
        if !self.countdown.resume() {
            return None;
        }
        debug!(remaining = self.countdown.remaining_secs(), "timer resumed");
        Some(Event::TimerResumed {
            remaining_secs: self.countdown.remaining_secs(),
            at: Utc::now(),
        })
    }

    pub(crate) fn not_allowed(&self, action: &'static str) -> SessionError {
        SessionError::NotAllowed {
            action,
            phase: self.phase.kind(),
        }
    }
}
