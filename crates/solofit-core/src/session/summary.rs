use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::Score;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Workout,
    Evaluation,
}

impl SessionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionKind::Workout => "workout",
            SessionKind::Evaluation => "evaluation",
        }
    }
}

/// How the user felt after a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackTag {
    Tired,
    Motivated,
    TooEasy,
    TooHard,
}

impl std::str::FromStr for FeedbackTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "tired" => Ok(FeedbackTag::Tired),
            "motivated" => Ok(FeedbackTag::Motivated),
            "too_easy" => Ok(FeedbackTag::TooEasy),
            "too_hard" => Ok(FeedbackTag::TooHard),
            other => Err(format!(
                "unknown feedback '{other}' (tired, motivated, too_easy, too_hard)"
            )),
        }
    }
}

/// Where an evaluation rep count came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepSource {
    /// Last value of the live counter.
    Counter,
    /// Typed in by the user during the rest period.
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseResult {
    pub id: String,
    pub name: String,
    pub sets: u32,
    /// Target reps per set (zero for evaluation intervals).
    pub reps: u32,
    pub completed_sets: u32,
    pub reps_done: u32,
    #[serde(default)]
    pub variant: Option<String>,
    #[serde(default)]
    pub rep_source: Option<RepSource>,
}

/// Outcome of a session, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub kind: SessionKind,
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_secs: u64,
    pub completed: bool,
    /// Present once the session is completed.
    pub score: Option<Score>,
    pub exercises: Vec<ExerciseResult>,
    #[serde(default)]
    pub feedback: Option<FeedbackTag>,
}

impl SessionSummary {
    pub fn total_reps(&self) -> u32 {
        self.exercises
            .iter()
            .map(|e| e.reps_done)
            .fold(0, u32::saturating_add)
    }

    pub fn points(&self) -> u32 {
        self.score.as_ref().map(|s| s.points).unwrap_or(0)
    }
}

pub(crate) fn elapsed_secs(started_at: DateTime<Utc>, ended_at: Option<DateTime<Utc>>) -> u64 {
    let end = ended_at.unwrap_or_else(Utc::now);
    (end - started_at).num_seconds().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_parses_loosely() {
        assert_eq!("Tired".parse::<FeedbackTag>().unwrap(), FeedbackTag::Tired);
        assert_eq!("too-easy".parse::<FeedbackTag>().unwrap(), FeedbackTag::TooEasy);
        assert_eq!("too_hard".parse::<FeedbackTag>().unwrap(), FeedbackTag::TooHard);
        assert!("bored".parse::<FeedbackTag>().is_err());
    }

    #[test]
    fn elapsed_never_negative() {
        let now = Utc::now();
        let earlier = now - chrono::Duration::seconds(30);
        assert_eq!(elapsed_secs(now, Some(earlier)), 0);
        assert_eq!(elapsed_secs(earlier, Some(now)), 30);
    }
}
