//! Progress statistics over the workout history.
//!
//! - **Totals**: workouts, minutes and points across all records
//! - **Streak**: consecutive days with at least one completed session,
//!   counted back from today (or yesterday, if nothing was done yet today)
//! - **Next rank**: points still missing to leave the current rank

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::profile::{Profile, WorkoutRecord};
use crate::scoring::Rank;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressStats {
    pub total_workouts: u32,
    pub completed_workouts: u32,
    pub total_minutes: u64,
    pub total_points: u32,
    pub streak_days: u32,
    pub rank: Rank,
    pub next_rank: Option<Rank>,
    pub points_to_next_rank: Option<u32>,
}

impl ProgressStats {
    pub fn compute(profile: &Profile, history: &[WorkoutRecord], today: NaiveDate) -> Self {
        let total_secs: u64 = history.iter().map(|r| r.duration_secs).sum();
        Self {
            total_workouts: history.len() as u32,
            completed_workouts: history.iter().filter(|r| r.completed).count() as u32,
            total_minutes: total_secs / 60,
            total_points: history
                .iter()
                .map(|r| r.points_earned)
                .fold(0, u32::saturating_add),
            streak_days: streak_days(history, today),
            rank: profile.rank,
            next_rank: profile.rank.next(),
            points_to_next_rank: profile.points_to_next_rank(),
        }
    }
}

/// Consecutive active days ending today, or yesterday when today is still empty.
pub fn streak_days(history: &[WorkoutRecord], today: NaiveDate) -> u32 {
    let days: BTreeSet<NaiveDate> = history
        .iter()
        .filter(|r| r.completed)
        .map(|r| r.performed_at.date_naive())
        .collect();

    let mut day = if days.contains(&today) {
        today
    } else {
        today - Duration::days(1)
    };
    let mut streak = 0;
    while days.contains(&day) {
        streak += 1;
        day -= Duration::days(1);
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionKind;
    use chrono::{TimeZone, Utc};

    fn record(day: u32, completed: bool, points: u32) -> WorkoutRecord {
        WorkoutRecord {
            id: format!("r{day}"),
            user_id: "u".into(),
            name: "Full Body Challenge".into(),
            kind: SessionKind::Workout,
            performed_at: Utc.with_ymd_and_hms(2025, 6, day, 18, 0, 0).unwrap(),
            duration_secs: 25 * 60,
            points_earned: points,
            completed,
            rank: None,
            feedback: None,
            exercises: vec![],
        }
    }

    fn june(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    #[test]
    fn streak_counts_back_from_today() {
        let history = vec![record(12, true, 15), record(11, true, 15), record(10, true, 12)];
        assert_eq!(streak_days(&history, june(12)), 3);
    }

    #[test]
    fn streak_allows_today_to_be_pending() {
        let history = vec![record(11, true, 15), record(10, true, 12)];
        assert_eq!(streak_days(&history, june(12)), 2);
        assert_eq!(streak_days(&history, june(13)), 0);
    }

    #[test]
    fn incomplete_sessions_break_streak() {
        let history = vec![record(12, true, 15), record(11, false, 8), record(10, true, 12)];
        assert_eq!(streak_days(&history, june(12)), 1);
    }

    #[test]
    fn totals_and_next_rank() {
        let mut profile = Profile::new("u");
        profile.points = 35;
        let history = vec![record(12, true, 15), record(10, true, 12), record(8, false, 8)];
        let stats = ProgressStats::compute(&profile, &history, june(12));
        assert_eq!(stats.total_workouts, 3);
        assert_eq!(stats.completed_workouts, 2);
        assert_eq!(stats.total_minutes, 75);
        assert_eq!(stats.total_points, 35);
        assert_eq!(stats.streak_days, 1);
        assert_eq!(stats.next_rank, Some(Rank::D));
        assert_eq!(stats.points_to_next_rank, Some(65));
    }

    #[test]
    fn empty_history() {
        let stats = ProgressStats::compute(&Profile::new("u"), &[], june(1));
        assert_eq!(stats.total_workouts, 0);
        assert_eq!(stats.streak_days, 0);
    }
}
