//! Single-slot countdown timer.
//!
//! Every `arm` hands out a fresh [`TimerId`]. Cancelling or expiring retires
//! that id, so a tick addressed to a retired id is ignored instead of
//! firing a second transition.

use serde::{Deserialize, Serialize};

/// Identity of one armed countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Tick for a retired timer, or the countdown is paused.
    Ignored,
    Running { remaining_secs: u32 },
    /// Reached zero. The timer is retired.
    Expired,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Countdown {
    remaining_secs: u32,
    max_secs: u32,
    paused: bool,
    armed: bool,
    generation: u64,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new countdown, retiring any previous one.
    pub fn arm(&mut self, secs: u32) -> TimerId {
        self.generation += 1;
        self.remaining_secs = secs;
        self.max_secs = secs;
        self.paused = false;
        self.armed = true;
        TimerId(self.generation)
    }

    /// Retire the running countdown. Returns false if nothing was armed.
    pub fn cancel(&mut self) -> bool {
        if !self.armed {
            return false;
        }
        self.armed = false;
        self.paused = false;
        self.generation += 1;
        true
    }

    pub fn pause(&mut self) -> bool {
        if !self.armed || self.paused {
            return false;
        }
        self.paused = true;
        true
    }

    pub fn resume(&mut self) -> bool {
        if !self.armed || !self.paused {
            return false;
        }
        self.paused = false;
        true
    }

    pub fn tick(&mut self, id: TimerId) -> TickOutcome {
        if !self.armed || self.paused || id.0 != self.generation {
            return TickOutcome::Ignored;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.armed = false;
            self.generation += 1;
            return TickOutcome::Expired;
        }
        TickOutcome::Running {
            remaining_secs: self.remaining_secs,
        }
    }

    /// Id of the armed countdown, if any.
    pub fn id(&self) -> Option<TimerId> {
        self.armed.then_some(TimerId(self.generation))
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn max_secs(&self) -> u32 {
        self.max_secs
    }

    /// 0.0 .. 1.0 progress of the current countdown.
    pub fn fraction(&self) -> f64 {
        if self.max_secs == 0 {
            return 0.0;
        }
        1.0 - (f64::from(self.remaining_secs) / f64::from(self.max_secs))
    }
}

/// Format seconds as `MM:SS`.
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
