//! Guided workout: fixed sets and reps, the user completes each set.
//!
//! ```text
//! WarmUp -> Active(0,0) -> Resting -> Active(0,1) -> ... -> Resting -> Completed
//! ```
//!
//! Active sets have no countdown. Warm-up and rest do; skipping either one
//! runs the same code as letting it expire.

use chrono::{DateTime, Utc};
use tracing::info;

use super::countdown::{Countdown, TickOutcome, TimerId};
use super::ledger::CompletionLedger;
use super::machine::{PhaseMachine, TimerSettings};
use super::phase::{Cursor, Phase, Upcoming};
use super::program::{Exercise, Program};
use super::summary::{elapsed_secs, ExerciseResult, FeedbackTag, SessionKind, SessionSummary};
use super::{Command, Session};
use crate::error::SessionError;
use crate::events::Event;
use crate::scoring::{motivational_message, Badge, Score};

#[derive(Debug, Clone)]
pub struct WorkoutSession {
    program: Program,
    timers: TimerSettings,
    machine: PhaseMachine,
    ledger: CompletionLedger,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    feedback: Option<FeedbackTag>,
    feedback_recorded: bool,
}

impl WorkoutSession {
    /// Start a workout. The session begins in `WarmUp` with its countdown running.
    pub fn new(program: Program, timers: TimerSettings) -> Self {
        info!(program = program.name(), sets = program.total_sets(), "workout started");
        Self {
            ledger: CompletionLedger::for_program(&program),
            machine: PhaseMachine::warm_up(timers.warmup_secs),
            program,
            timers,
            started_at: Utc::now(),
            ended_at: None,
            feedback: None,
            feedback_recorded: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn ledger(&self) -> &CompletionLedger {
        &self.ledger
    }

    /// Set being performed, or the next one while resting.
    pub fn cursor(&self) -> Option<Cursor> {
        match self.machine.phase() {
            Phase::WarmUp => Some(Cursor::START),
            Phase::Active { at } => Some(*at),
            Phase::Resting {
                upcoming: Upcoming::Next(next),
                ..
            } => Some(*next),
            _ => None,
        }
    }

    pub fn current_exercise(&self) -> Option<&Exercise> {
        self.cursor().and_then(|c| self.program.get(c.exercise))
    }

    pub fn completion_pct(&self) -> u8 {
        self.ledger.completion_pct()
    }

    pub fn motivational_message(&self) -> Badge {
        motivational_message(self.completion_pct())
    }

    pub fn feedback(&self) -> Option<FeedbackTag> {
        self.feedback
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Mark the active set done and start the rest period.
    pub fn complete_set(&mut self) -> Result<Vec<Event>, SessionError> {
        let Phase::Active { at } = *self.machine.phase() else {
            return Err(self.machine.not_allowed("complete"));
        };
        self.machine.cancel_timer();
        let exercise_id = self.program.exercises()[at.exercise].id.clone();
        self.ledger.mark(&exercise_id, at.set);
        let completed = Event::SetCompleted {
            exercise_id,
            set: at.set,
            completion_pct: self.ledger.completion_pct(),
            at: Utc::now(),
        };
        let upcoming = self.advance(at);
        let rest = self.machine.enter(
            Phase::Resting {
                finished: at,
                upcoming,
            },
            Some(self.timers.rest_secs),
        );
        Ok(vec![completed, rest])
    }

    /// End the running warm-up or rest countdown now.
    pub fn skip(&mut self) -> Result<Event, SessionError> {
        if !self.machine.cancel_timer() {
            return Err(self.machine.not_allowed("skip"));
        }
        Ok(self.expire())
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.machine.pause()
    }

    pub fn resume(&mut self) -> Option<Event> {
        self.machine.resume()
    }

    /// Capture post-workout feedback once. `None` dismisses the prompt.
    pub fn record_feedback(&mut self, tag: Option<FeedbackTag>) -> Result<Event, SessionError> {
        if !self.machine.phase().is_completed() {
            return Err(self.machine.not_allowed("feedback"));
        }
        if self.feedback_recorded {
            return Err(SessionError::FeedbackAlreadyRecorded);
        }
        self.feedback = tag;
        self.feedback_recorded = true;
        Ok(Event::FeedbackRecorded {
            feedback: tag,
            at: Utc::now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Next set in program order, or the end of the workout.
    fn advance(&self, at: Cursor) -> Upcoming {
        let sets = self.program.exercises()[at.exercise].sets as usize;
        if at.set + 1 < sets {
            Upcoming::Next(Cursor::new(at.exercise, at.set + 1))
        } else if at.exercise + 1 < self.program.len() {
            Upcoming::Next(Cursor::new(at.exercise + 1, 0))
        } else {
            Upcoming::Finish
        }
    }

    /// Transition taken when the countdown ends, whether by time or by skip.
    fn expire(&mut self) -> Event {
        match self.machine.phase().clone() {
            Phase::WarmUp => self.machine.enter(Phase::Active { at: Cursor::START }, None),
            Phase::Resting {
                upcoming: Upcoming::Next(next),
                ..
            } => self.machine.enter(Phase::Active { at: next }, None),
            Phase::Resting {
                upcoming: Upcoming::Finish,
                ..
            } => self.finish(),
            other => unreachable!("no countdown runs during {:?}", other.kind()),
        }
    }

    fn finish(&mut self) -> Event {
        self.ended_at = Some(Utc::now());
        let score = Score::for_workout(self.reps_done(), self.completion_pct());
        info!(points = score.points, pct = score.completion_pct, "workout completed");
        self.machine.enter(Phase::Completed { score }, None)
    }

    fn reps_done(&self) -> u32 {
        self.program
            .exercises()
            .iter()
            .map(|e| self.ledger.completed_sets_for(&e.id).saturating_mul(e.reps))
            .fold(0, u32::saturating_add)
    }
}

impl Session for WorkoutSession {
    fn kind(&self) -> SessionKind {
        SessionKind::Workout
    }

    fn phase(&self) -> &Phase {
        self.machine.phase()
    }

    fn countdown(&self) -> &Countdown {
        self.machine.countdown()
    }

    fn tick_timer(&mut self, id: TimerId) -> Option<Event> {
        match self.machine.tick(id) {
            TickOutcome::Expired => Some(self.expire()),
            TickOutcome::Running { .. } | TickOutcome::Ignored => None,
        }
    }

    fn apply(&mut self, command: Command) -> Result<Vec<Event>, SessionError> {
        match command {
            Command::Complete => self.complete_set(),
            Command::Skip => self.skip().map(|e| vec![e]),
            Command::Pause => self
                .pause()
                .map(|e| vec![e])
                .ok_or_else(|| self.machine.not_allowed("pause")),
            Command::Resume => self
                .resume()
                .map(|e| vec![e])
                .ok_or_else(|| self.machine.not_allowed("resume")),
            Command::Feedback(tag) => self.record_feedback(tag).map(|e| vec![e]),
            other => Err(SessionError::Unsupported {
                action: other.name(),
                mode: SessionKind::Workout.as_str(),
            }),
        }
    }

    fn snapshot(&self) -> Event {
        let countdown = self.machine.countdown();
        Event::StateSnapshot {
            kind: SessionKind::Workout,
            phase: self.machine.phase().clone(),
            exercise_name: self.current_exercise().map(|e| e.name.clone()),
            remaining_secs: countdown.remaining_secs(),
            max_secs: countdown.max_secs(),
            timer_progress: countdown.fraction(),
            paused: countdown.is_paused(),
            completion_pct: self.completion_pct(),
            reps: self.current_exercise().map(|e| e.reps),
            message: self.motivational_message(),
            at: Utc::now(),
        }
    }

    fn summary(&self) -> SessionSummary {
        let exercises = self
            .program
            .exercises()
            .iter()
            .map(|e| {
                let completed_sets = self.ledger.completed_sets_for(&e.id);
                ExerciseResult {
                    id: e.id.clone(),
                    name: e.name.clone(),
                    sets: e.sets,
                    reps: e.reps,
                    completed_sets,
                    reps_done: completed_sets.saturating_mul(e.reps),
                    variant: None,
                    rep_source: None,
                }
            })
            .collect();
        let score = match self.machine.phase() {
            Phase::Completed { score } => Some(score.clone()),
            _ => None,
        };
        SessionSummary {
            kind: SessionKind::Workout,
            name: self.program.name().to_string(),
            started_at: self.started_at,
            ended_at: self.ended_at,
            duration_secs: elapsed_secs(self.started_at, self.ended_at),
            completed: score.is_some(),
            score,
            exercises,
            feedback: self.feedback,
        }
    }

    fn transitions(&self) -> u32 {
        self.machine.transitions()
    }
}
