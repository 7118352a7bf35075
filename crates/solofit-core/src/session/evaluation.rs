//! Fitness evaluation: a timed max-effort interval per exercise.
//!
//! ```text
//! WarmUp -> ReadyPrompt(0) -> Active(0) -> Resting -> ReadyPrompt(1) -> ... -> Resting -> Completed
//! ```
//!
//! Every exercise is visited exactly once, in program order. Reps are counted
//! live during the interval and can be corrected by hand while resting.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::countdown::{Countdown, TickOutcome, TimerId};
use super::ledger::RepCounter;
use super::machine::{PhaseMachine, TimerSettings};
use super::phase::{Cursor, Phase, Upcoming};
use super::program::{Exercise, Program};
use super::summary::{
    elapsed_secs, ExerciseResult, FeedbackTag, RepSource, SessionKind, SessionSummary,
};
use super::{Command, Session};
use crate::error::SessionError;
use crate::events::Event;
use crate::scoring::{completion_pct, evaluation_rank, Badge, Score};

#[derive(Debug, Clone, Default)]
struct Entry {
    reps: RepCounter,
    closed: bool,
    manual: bool,
    variant: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EvaluationSession {
    program: Program,
    timers: TimerSettings,
    machine: PhaseMachine,
    entries: Vec<Entry>,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    feedback: Option<FeedbackTag>,
    feedback_recorded: bool,
}

impl EvaluationSession {
    /// Start an evaluation. The session begins in `WarmUp` with its countdown running.
    pub fn new(program: Program, timers: TimerSettings) -> Self {
        info!(program = program.name(), exercises = program.len(), "evaluation started");
        Self {
            entries: vec![Entry::default(); program.len()],
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

    pub fn current_exercise(&self) -> Option<&Exercise> {
        self.machine
            .phase()
            .exercise_index()
            .and_then(|i| self.program.get(i))
    }

    /// Recorded reps for the exercise at `index`.
    pub fn reps(&self, index: usize) -> Option<u32> {
        self.entries.get(index).map(|e| e.reps.value())
    }

    pub fn variant(&self, index: usize) -> Option<&str> {
        self.entries.get(index).and_then(|e| e.variant.as_deref())
    }

    pub fn total_reps(&self) -> u32 {
        self.entries
            .iter()
            .map(|e| e.reps.value())
            .fold(0, u32::saturating_add)
    }

    pub fn completion_pct(&self) -> u8 {
        let closed = self.entries.iter().filter(|e| e.closed).count() as u32;
        completion_pct(closed, self.entries.len() as u32)
    }

    /// Rank the current totals would earn.
    pub fn provisional_badge(&self) -> Badge {
        let rank = evaluation_rank(self.total_reps());
        Badge {
            label: format!("Rank {rank}"),
            color: rank.color().into(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Pick one of the exercise's variants while its ready prompt is shown.
    pub fn select_variant(&mut self, variant: &str) -> Result<Event, SessionError> {
        let Phase::ReadyPrompt { exercise } = *self.machine.phase() else {
            return Err(self.machine.not_allowed("select variant"));
        };
        let def = &self.program.exercises()[exercise];
        let Some(chosen) = def
            .variants
            .iter()
            .find(|v| v.eq_ignore_ascii_case(variant.trim()))
            .cloned()
        else {
            return Err(SessionError::UnknownVariant {
                exercise: def.name.clone(),
                variant: variant.to_string(),
            });
        };
        let exercise_id = def.id.clone();
        debug!(exercise = %exercise_id, variant = %chosen, "variant selected");
        self.entries[exercise].variant = Some(chosen.clone());
        Ok(Event::VariantSelected {
            exercise_id,
            variant: chosen,
            at: Utc::now(),
        })
    }

    /// Leave the ready prompt and start the exercise interval.
    pub fn confirm_ready(&mut self) -> Result<Event, SessionError> {
        let Phase::ReadyPrompt { exercise } = *self.machine.phase() else {
            return Err(self.machine.not_allowed("ready"));
        };
        let def = &self.program.exercises()[exercise];
        if !def.variants.is_empty() && self.entries[exercise].variant.is_none() {
            return Err(SessionError::VariantRequired {
                exercise: def.name.clone(),
                options: def.variants.join(", "),
            });
        }
        Ok(self.machine.enter(
            Phase::Active {
                at: Cursor::new(exercise, 0),
            },
            Some(self.timers.exercise_secs),
        ))
    }

    pub fn increment(&mut self) -> Result<Event, SessionError> {
        self.count(true)
    }

    /// Saturates at zero.
    pub fn decrement(&mut self) -> Result<Event, SessionError> {
        self.count(false)
    }

    /// Finish the active exercise before its interval runs out.
    pub fn complete_exercise(&mut self) -> Result<Event, SessionError> {
        let Phase::Active { at } = *self.machine.phase() else {
            return Err(self.machine.not_allowed("complete"));
        };
        self.machine.cancel_timer();
        Ok(self.close(at))
    }

    /// Overwrite the reps of the exercise just finished. Only while resting.
    ///
    /// Input must be a whole number of zero or more; anything else is
    /// rejected and the recorded count is kept. Counts beyond `u32::MAX`
    /// are clamped to it.
    pub fn enter_reps(&mut self, input: &str) -> Result<Event, SessionError> {
        let Phase::Resting { finished, .. } = *self.machine.phase() else {
            return Err(self.machine.not_allowed("enter reps"));
        };
        let trimmed = input.trim();
        let reps = if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            // All digits, so parsing fails only on overflow.
            Some(trimmed.parse::<u32>().unwrap_or(u32::MAX))
        } else {
            None
        };
        let Some(reps) = reps else {
            return Err(SessionError::InvalidReps {
                input: input.to_string(),
            });
        };
        let entry = &mut self.entries[finished.exercise];
        entry.reps.set(reps);
        entry.manual = true;
        Ok(Event::RepsChanged {
            exercise_id: self.program.exercises()[finished.exercise].id.clone(),
            reps,
            source: RepSource::Manual,
            at: Utc::now(),
        })
    }

    /// End the running countdown now.
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

    /// Capture post-evaluation feedback once. `None` dismisses the prompt.
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

    fn count(&mut self, up: bool) -> Result<Event, SessionError> {
        let Phase::Active { at } = *self.machine.phase() else {
            return Err(self
                .machine
                .not_allowed(if up { "increment" } else { "decrement" }));
        };
        let counter = &mut self.entries[at.exercise].reps;
        let reps = if up {
            counter.increment()
        } else {
            counter.decrement()
        };
        Ok(Event::RepsChanged {
            exercise_id: self.program.exercises()[at.exercise].id.clone(),
            reps,
            source: RepSource::Counter,
            at: Utc::now(),
        })
    }

    /// Close the exercise at `at` and rest before the next one.
    fn close(&mut self, at: Cursor) -> Event {
        self.entries[at.exercise].closed = true;
        let upcoming = if at.exercise + 1 < self.program.len() {
            Upcoming::Next(Cursor::new(at.exercise + 1, 0))
        } else {
            Upcoming::Finish
        };
        debug!(
            exercise = at.exercise,
            reps = self.entries[at.exercise].reps.value(),
            "exercise closed"
        );
        self.machine.enter(
            Phase::Resting {
                finished: at,
                upcoming,
            },
            Some(self.timers.rest_secs),
        )
    }

    /// Transition taken when the countdown ends, whether by time or by skip.
    fn expire(&mut self) -> Event {
        match self.machine.phase().clone() {
            Phase::WarmUp => self.machine.enter(Phase::ReadyPrompt { exercise: 0 }, None),
            Phase::Active { at } => self.close(at),
            Phase::Resting {
                upcoming: Upcoming::Next(next),
                ..
            } => self.machine.enter(
                Phase::ReadyPrompt {
                    exercise: next.exercise,
                },
                None,
            ),
            Phase::Resting {
                upcoming: Upcoming::Finish,
                ..
            } => self.finish(),
            other => unreachable!("no countdown runs during {:?}", other.kind()),
        }
    }

    fn finish(&mut self) -> Event {
        self.ended_at = Some(Utc::now());
        let score = Score::for_evaluation(self.total_reps(), self.completion_pct());
        info!(total_reps = score.total_reps, rank = ?score.rank, "evaluation completed");
        self.machine.enter(Phase::Completed { score }, None)
    }
}

impl Session for EvaluationSession {
    fn kind(&self) -> SessionKind {
        SessionKind::Evaluation
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
        let event = match command {
            Command::Complete => self.complete_exercise()?,
            Command::Skip => self.skip()?,
            Command::Pause => self
                .pause()
                .ok_or_else(|| self.machine.not_allowed("pause"))?,
            Command::Resume => self
                .resume()
                .ok_or_else(|| self.machine.not_allowed("resume"))?,
            Command::Increment => self.increment()?,
            Command::Decrement => self.decrement()?,
            Command::EnterReps(input) => self.enter_reps(&input)?,
            Command::ConfirmReady => self.confirm_ready()?,
            Command::SelectVariant(variant) => self.select_variant(&variant)?,
            Command::Feedback(tag) => self.record_feedback(tag)?,
        };
        Ok(vec![event])
    }

    fn snapshot(&self) -> Event {
        let countdown = self.machine.countdown();
        let index = self.machine.phase().exercise_index();
        Event::StateSnapshot {
            kind: SessionKind::Evaluation,
            phase: self.machine.phase().clone(),
            exercise_name: self.current_exercise().map(|e| e.name.clone()),
            remaining_secs: countdown.remaining_secs(),
            max_secs: countdown.max_secs(),
            timer_progress: countdown.fraction(),
            paused: countdown.is_paused(),
            completion_pct: self.completion_pct(),
            reps: index.and_then(|i| self.reps(i)),
            message: self.provisional_badge(),
            at: Utc::now(),
        }
    }

    fn summary(&self) -> SessionSummary {
        let exercises = self
            .program
            .exercises()
            .iter()
            .zip(&self.entries)
            .map(|(def, entry)| ExerciseResult {
                id: def.id.clone(),
                name: def.name.clone(),
                sets: def.sets,
                reps: def.reps,
                completed_sets: u32::from(entry.closed),
                reps_done: entry.reps.value(),
                variant: entry.variant.clone(),
                rep_source: Some(if entry.manual {
                    RepSource::Manual
                } else {
                    RepSource::Counter
                }),
            })
            .collect();
        let score = match self.machine.phase() {
            Phase::Completed { score } => Some(score.clone()),
            _ => None,
        };
        SessionSummary {
            kind: SessionKind::Evaluation,
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
