//! Session engine.
//!
//! A session walks a [`Program`] through its phases. It does not use
//! internal threads or timers of its own - the owner feeds it one tick per
//! second (see [`crate::ticks`]) and user [`Command`]s.
//!
//! ## Usage
//!
//! ```ignore
//! let mut session = WorkoutSession::new(Program::full_body(), TimerSettings::default());
//! // Once per second:
//! session.tick(); // Returns Some(Event) when a countdown expires
//! session.apply(Command::Complete)?;
//! ```

mod command;
mod countdown;
mod evaluation;
mod ledger;
mod machine;
mod phase;
mod program;
mod summary;
mod workout;

pub use command::{Command, Input};
pub use countdown::{format_clock, Countdown, TickOutcome, TimerId};
pub use evaluation::EvaluationSession;
pub use ledger::{CompletionLedger, RepCounter};
pub use machine::TimerSettings;
pub use phase::{Cursor, Phase, PhaseKind, Upcoming};
pub use program::{Exercise, Program};
pub use summary::{ExerciseResult, FeedbackTag, RepSource, SessionKind, SessionSummary};
pub use workout::WorkoutSession;

use crate::error::SessionError;
use crate::events::Event;

/// Common surface of workout and evaluation sessions.
pub trait Session {
    fn kind(&self) -> SessionKind;

    fn phase(&self) -> &Phase;

    fn countdown(&self) -> &Countdown;

    /// Apply one tick to the countdown identified by `id`.
    ///
    /// Ticks for a cancelled or expired countdown are ignored, so a late
    /// tick can never fire a second transition for the same phase entry.
    fn tick_timer(&mut self, id: TimerId) -> Option<Event>;

    /// Apply a user command. On error the session is unchanged.
    fn apply(&mut self, command: Command) -> Result<Vec<Event>, SessionError>;

    /// Full state snapshot for rendering.
    fn snapshot(&self) -> Event;

    fn summary(&self) -> SessionSummary;

    /// Number of phase transitions taken so far.
    fn transitions(&self) -> u32;

    /// Tick the currently armed countdown, if any.
    fn tick(&mut self) -> Option<Event> {
        let id = self.countdown().id()?;
        self.tick_timer(id)
    }

    fn timer_id(&self) -> Option<TimerId> {
        self.countdown().id()
    }

    fn is_completed(&self) -> bool {
        self.phase().is_completed()
    }
}
