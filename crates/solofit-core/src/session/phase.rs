//! Session phases and the transition table.
//!
//! ```text
//! WarmUp -> Active                       (workout)
//! WarmUp -> ReadyPrompt -> Active        (evaluation)
//! Active -> Resting -> Active | ReadyPrompt | Completed
//! ```

use serde::{Deserialize, Serialize};

use crate::scoring::Score;

/// Position inside a program: exercise index and set index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cursor {
    pub exercise: usize,
    pub set: usize,
}

impl Cursor {
    pub const START: Cursor = Cursor { exercise: 0, set: 0 };

    pub fn new(exercise: usize, set: usize) -> Self {
        Self { exercise, set }
    }
}

/// Where a rest period leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Upcoming {
    Next(Cursor),
    Finish,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    WarmUp,
    /// Waiting for the user to confirm they are ready for `exercise`.
    ReadyPrompt { exercise: usize },
    Active { at: Cursor },
    /// Recovering after `finished`; `upcoming` is decided on entry.
    Resting { finished: Cursor, upcoming: Upcoming },
    Completed { score: Score },
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::WarmUp => PhaseKind::WarmUp,
            Phase::ReadyPrompt { .. } => PhaseKind::ReadyPrompt,
            Phase::Active { .. } => PhaseKind::Active,
            Phase::Resting { .. } => PhaseKind::Resting,
            Phase::Completed { .. } => PhaseKind::Completed,
        }
    }

    /// Exercise the phase refers to, if any.
    pub fn exercise_index(&self) -> Option<usize> {
        match self {
            Phase::ReadyPrompt { exercise } => Some(*exercise),
            Phase::Active { at } => Some(at.exercise),
            Phase::Resting { finished, .. } => Some(finished.exercise),
            Phase::WarmUp | Phase::Completed { .. } => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Phase::Completed { .. })
    }
}

/// Payload-free phase tag, used for the transition table and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    WarmUp,
    ReadyPrompt,
    Active,
    Resting,
    Completed,
}

impl PhaseKind {
    pub fn can_transition_to(self, next: PhaseKind) -> bool {
        use PhaseKind::*;
        matches!(
            (self, next),
            (WarmUp, Active)
                | (WarmUp, ReadyPrompt)
                | (ReadyPrompt, Active)
                | (Active, Resting)
                | (Resting, Active)
                | (Resting, ReadyPrompt)
                | (Resting, Completed)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [PhaseKind; 5] = [
        PhaseKind::WarmUp,
        PhaseKind::ReadyPrompt,
        PhaseKind::Active,
        PhaseKind::Resting,
        PhaseKind::Completed,
    ];

    #[test]
    fn completed_is_terminal() {
        for next in ALL {
            assert!(!PhaseKind::Completed.can_transition_to(next));
        }
    }

    #[test]
    fn no_self_transitions() {
        for kind in ALL {
            assert!(!kind.can_transition_to(kind));
        }
    }

    #[test]
    fn active_only_leads_to_rest() {
        let targets: Vec<_> = ALL
            .into_iter()
            .filter(|k| PhaseKind::Active.can_transition_to(*k))
            .collect();
        assert_eq!(targets, vec![PhaseKind::Resting]);
    }

    #[test]
    fn phase_serializes_with_tag() {
        let phase = Phase::Resting {
            finished: Cursor::new(0, 2),
            upcoming: Upcoming::Next(Cursor::new(1, 0)),
        };
        let json = serde_json::to_value(&phase).unwrap();
        assert_eq!(json["phase"], "resting");
        assert_eq!(json["upcoming"]["kind"], "next");
        assert_eq!(json["upcoming"]["exercise"], 1);
    }
}
