//! Rank and score derivation.
//!
//! Everything here is a pure function of performance totals. Each derivation
//! is defined for every non-negative input and never ranks a better
//! performance lower than a worse one.

use serde::{Deserialize, Serialize};

/// Skill tier, ordered from lowest (`E`) to highest (`S`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    E,
    D,
    C,
    B,
    A,
    S,
}

impl Rank {
    pub fn color(self) -> &'static str {
        match self {
            Rank::E => "#ef4444",
            Rank::D => "#eab308",
            Rank::C => "#22c55e",
            Rank::B => "#3b82f6",
            Rank::A => "#a855f7",
            Rank::S => "#f59e0b",
        }
    }

    pub fn next(self) -> Option<Rank> {
        match self {
            Rank::E => Some(Rank::D),
            Rank::D => Some(Rank::C),
            Rank::C => Some(Rank::B),
            Rank::B => Some(Rank::A),
            Rank::A => Some(Rank::S),
            Rank::S => None,
        }
    }

    /// Total points required to leave this rank, `None` at the top.
    pub fn points_for_next(self) -> Option<u32> {
        match self {
            Rank::E => Some(100),
            Rank::D => Some(250),
            Rank::C => Some(500),
            Rank::B => Some(1000),
            Rank::A => Some(2000),
            Rank::S => None,
        }
    }

    /// Climb the ladder as far as `points` allows. Never demotes.
    pub fn promote(self, points: u32) -> Rank {
        let mut rank = self;
        while let (Some(needed), Some(next)) = (rank.points_for_next(), rank.next()) {
            if points < needed {
                break;
            }
            rank = next;
        }
        rank
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rank::E => "E",
            Rank::D => "D",
            Rank::C => "C",
            Rank::B => "B",
            Rank::A => "A",
            Rank::S => "S",
        }
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Rank {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "E" => Ok(Rank::E),
            "D" => Ok(Rank::D),
            "C" => Ok(Rank::C),
            "B" => Ok(Rank::B),
            "A" => Ok(Rank::A),
            "S" => Ok(Rank::S),
            other => Err(format!("unknown rank '{other}'")),
        }
    }
}

/// A label with its display color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub label: String,
    pub color: String,
}

/// Final score of a session. Carried by the `Completed` phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub points: u32,
    pub total_reps: u32,
    pub completion_pct: u8,
    /// Rank earned by an evaluation. Workouts do not rank directly.
    #[serde(default)]
    pub rank: Option<Rank>,
    pub badge: Badge,
}

impl Score {
    pub fn for_evaluation(total_reps: u32, completion_pct: u8) -> Self {
        let rank = evaluation_rank(total_reps);
        Self {
            points: evaluation_points(total_reps),
            total_reps,
            completion_pct,
            rank: Some(rank),
            badge: Badge {
                label: format!("Rank {rank}"),
                color: rank.color().into(),
            },
        }
    }

    pub fn for_workout(total_reps: u32, completion_pct: u8) -> Self {
        Self {
            points: workout_points(completion_pct),
            total_reps,
            completion_pct,
            rank: None,
            badge: motivational_message(completion_pct),
        }
    }
}

/// Evaluation breakpoints: >250 B, >150 C, >75 D, else E.
pub fn evaluation_rank(total_reps: u32) -> Rank {
    match total_reps {
        r if r > 250 => Rank::B,
        r if r > 150 => Rank::C,
        r if r > 75 => Rank::D,
        _ => Rank::E,
    }
}

/// One point per ten reps, rounded half up.
pub fn evaluation_points(total_reps: u32) -> u32 {
    total_reps.saturating_add(5) / 10
}

/// Points for a full workout.
pub const WORKOUT_POINTS: u32 = 15;

/// Workout points scaled by completion, rounded half up.
pub fn workout_points(completion_pct: u8) -> u32 {
    let pct = u32::from(completion_pct.min(100));
    (WORKOUT_POINTS * pct + 50) / 100
}

/// Encouragement shown during a workout, by completion percent.
pub fn motivational_message(completion_pct: u8) -> Badge {
    let (label, color) = match completion_pct {
        0 => ("Let's go! Show what you can do.", "#ef4444"),
        1..=24 => ("Good start! Keep it up.", "#f97316"),
        25..=49 => ("You're on the right track. Don't give up!", "#eab308"),
        50..=74 => ("Past halfway! You can do it.", "#22c55e"),
        75..=99 => ("Almost done! Give it everything you have left.", "#3b82f6"),
        _ => ("Incredible! You completed the workout.", "#a855f7"),
    };
    Badge {
        label: label.into(),
        color: color.into(),
    }
}

/// Rounded percentage that reports 100 only when `done == total`.
pub fn completion_pct(done: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let done = done.min(total);
    let pct = ((u64::from(done) * 200 + u64::from(total)) / (u64::from(total) * 2)) as u8;
    if pct == 100 && done < total {
        99
    } else {
        pct
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn evaluation_breakpoints() {
        assert_eq!(evaluation_rank(0), Rank::E);
        assert_eq!(evaluation_rank(75), Rank::E);
        assert_eq!(evaluation_rank(76), Rank::D);
        assert_eq!(evaluation_rank(80), Rank::D);
        assert_eq!(evaluation_rank(150), Rank::D);
        assert_eq!(evaluation_rank(160), Rank::C);
        assert_eq!(evaluation_rank(250), Rank::C);
        assert_eq!(evaluation_rank(260), Rank::B);
    }

    #[test]
    fn evaluation_points_round_half_up() {
        assert_eq!(evaluation_points(0), 0);
        assert_eq!(evaluation_points(4), 0);
        assert_eq!(evaluation_points(5), 1);
        assert_eq!(evaluation_points(164), 16);
        assert_eq!(evaluation_points(165), 17);
        assert_eq!(evaluation_points(u32::MAX), u32::MAX / 10);
    }

    #[test]
    fn workout_points_scale_with_completion() {
        assert_eq!(workout_points(0), 0);
        assert_eq!(workout_points(50), 8);
        assert_eq!(workout_points(100), WORKOUT_POINTS);
    }

    #[test]
    fn completion_pct_edges() {
        assert_eq!(completion_pct(0, 0), 0);
        assert_eq!(completion_pct(0, 5), 0);
        assert_eq!(completion_pct(1, 3), 33);
        assert_eq!(completion_pct(2, 3), 67);
        assert_eq!(completion_pct(5, 5), 100);
        // 199/200 rounds to 100 but is not finished.
        assert_eq!(completion_pct(199, 200), 99);
    }

    #[test]
    fn promotion_climbs_multiple_ranks() {
        assert_eq!(Rank::E.promote(0), Rank::E);
        assert_eq!(Rank::E.promote(100), Rank::D);
        assert_eq!(Rank::E.promote(600), Rank::B);
        assert_eq!(Rank::A.promote(5000), Rank::S);
        assert_eq!(Rank::S.promote(10), Rank::S);
        assert_eq!(Rank::C.promote(0), Rank::C);
    }

    #[test]
    fn rank_parses_and_displays() {
        assert_eq!("C".parse::<Rank>().unwrap(), Rank::C);
        assert!("Z".parse::<Rank>().is_err());
        assert_eq!(Rank::S.to_string(), "S");
    }

    #[test]
    fn motivational_tiers() {
        assert_eq!(motivational_message(0).color, "#ef4444");
        assert_eq!(motivational_message(100).label, "Incredible! You completed the workout.");
        assert_ne!(motivational_message(99).label, motivational_message(100).label);
    }

    fn tier(pct: u8) -> usize {
        ["#ef4444", "#f97316", "#eab308", "#22c55e", "#3b82f6", "#a855f7"]
            .iter()
            .position(|c| *c == motivational_message(pct).color)
            .unwrap()
    }

    proptest! {
        #[test]
        fn evaluation_rank_is_monotonic(a in 0u32..2000, b in 0u32..2000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(evaluation_rank(lo) <= evaluation_rank(hi));
            prop_assert!(evaluation_points(lo) <= evaluation_points(hi));
        }

        #[test]
        fn motivational_message_is_monotonic(a in 0u8..=100, b in 0u8..=100) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(tier(lo) <= tier(hi));
            prop_assert!(workout_points(lo) <= workout_points(hi));
        }

        #[test]
        fn completion_pct_is_monotonic_and_exact_at_end(total in 1u32..500, a in 0u32..500, b in 0u32..500) {
            let (lo, hi) = if a <= b { (a.min(total), b.min(total)) } else { (b.min(total), a.min(total)) };
            prop_assert!(completion_pct(lo, total) <= completion_pct(hi, total));
            prop_assert_eq!(completion_pct(hi, total) == 100, hi == total);
        }

        #[test]
        fn promotion_never_demotes(points in 0u32..5000) {
            for rank in [Rank::E, Rank::D, Rank::C, Rank::B, Rank::A, Rank::S] {
                prop_assert!(rank.promote(points) >= rank);
            }
        }
    }
}
