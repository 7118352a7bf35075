use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::Badge;
use crate::session::{FeedbackTag, Phase, PhaseKind, RepSource, SessionKind};

/// Every state change of a session produces an Event.
/// Screens render from them; the driver forwards them to its observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    PhaseChanged {
        from: PhaseKind,
        to: Phase,
        /// Countdown armed for the new phase, if any.
        timer_secs: Option<u32>,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    SetCompleted {
        exercise_id: String,
        set: usize,
        completion_pct: u8,
        at: DateTime<Utc>,
    },
    RepsChanged {
        exercise_id: String,
        reps: u32,
        source: RepSource,
        at: DateTime<Utc>,
    },
    VariantSelected {
        exercise_id: String,
        variant: String,
        at: DateTime<Utc>,
    },
    /// `None` means the user dismissed the feedback prompt.
    FeedbackRecorded {
        feedback: Option<FeedbackTag>,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        kind: SessionKind,
        phase: Phase,
        exercise_name: Option<String>,
        remaining_secs: u32,
        max_secs: u32,
        /// 0.0 .. 1.0 progress of the running countdown.
        timer_progress: f64,
        paused: bool,
        completion_pct: u8,
        reps: Option<u32>,
        message: Badge,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn is_phase_change(&self) -> bool {
        matches!(self, Event::PhaseChanged { .. })
    }
}
