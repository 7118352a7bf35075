//! User profile and workout history, behind the [`ProfileStore`] seam.
//!
//! The session engine never reads ambient state: whoever owns a session
//! hands it a store. [`MemoryStore`] backs tests, the SQLite
//! [`Database`](crate::storage::Database) backs the CLI.

mod memory;

pub use memory::MemoryStore;

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::scoring::Rank;
use crate::session::{ExerciseResult, FeedbackTag, SessionKind, SessionSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// Tone the coach uses with the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoachingStyle {
    Caring,
    Strict,
    Balanced,
}

macro_rules! str_enum {
    ($ty:ty { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl std::str::FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    other => Err(format!("unknown value '{other}'")),
                }
            }
        }
    };
}

str_enum!(Gender { Male => "male", Female => "female" });
str_enum!(CoachingStyle { Caring => "caring", Strict => "strict", Balanced => "balanced" });

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub weight_kg: Option<f32>,
    #[serde(default)]
    pub height_cm: Option<u32>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub coaching_style: Option<CoachingStyle>,
    pub rank: Rank,
    pub points: u32,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Fresh profile at rank E with no points.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            name: None,
            age: None,
            weight_kg: None,
            height_cm: None,
            gender: None,
            coaching_style: None,
            rank: Rank::E,
            points: 0,
            created_at: Utc::now(),
        }
    }

    /// Overwrite every field the update sets.
    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(name) = &update.name {
            self.name = Some(name.clone());
        }
        if let Some(age) = update.age {
            self.age = Some(age);
        }
        if let Some(weight) = update.weight_kg {
            self.weight_kg = Some(weight);
        }
        if let Some(height) = update.height_cm {
            self.height_cm = Some(height);
        }
        if let Some(gender) = update.gender {
            self.gender = Some(gender);
        }
        if let Some(style) = update.coaching_style {
            self.coaching_style = Some(style);
        }
        if let Some(rank) = update.rank {
            self.rank = rank;
        }
        if let Some(points) = update.points {
            self.points = points;
        }
    }

    /// Points still missing for the next rank, `None` at the top.
    pub fn points_to_next_rank(&self) -> Option<u32> {
        self.rank
            .points_for_next()
            .map(|needed| needed.saturating_sub(self.points))
    }
}

/// Partial profile update. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub weight_kg: Option<f32>,
    pub height_cm: Option<u32>,
    pub gender: Option<Gender>,
    pub coaching_style: Option<CoachingStyle>,
    pub rank: Option<Rank>,
    pub points: Option<u32>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One finished session in the workout history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub kind: SessionKind,
    pub performed_at: DateTime<Utc>,
    pub duration_secs: u64,
    pub points_earned: u32,
    pub completed: bool,
    #[serde(default)]
    pub rank: Option<Rank>,
    #[serde(default)]
    pub feedback: Option<FeedbackTag>,
    pub exercises: Vec<ExerciseResult>,
}

impl WorkoutRecord {
    pub fn from_summary(user_id: impl Into<String>, summary: &SessionSummary) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            name: summary.name.clone(),
            kind: summary.kind,
            performed_at: summary.ended_at.unwrap_or(summary.started_at),
            duration_secs: summary.duration_secs,
            points_earned: summary.points(),
            completed: summary.completed,
            rank: summary.score.as_ref().and_then(|s| s.rank),
            feedback: summary.feedback,
            exercises: summary.exercises.clone(),
        }
    }
}

/// Access to the hosted (or local) profile backend.
///
/// Calls may fail with transport or authorization errors; callers treat
/// every failure as non-fatal to the session in progress.
pub trait ProfileStore: Send + Sync {
    fn current_profile(&self) -> impl Future<Output = Result<Profile, StoreError>> + Send;

    fn update_profile(
        &self,
        update: ProfileUpdate,
    ) -> impl Future<Output = Result<Profile, StoreError>> + Send;

    fn append_history(
        &self,
        record: WorkoutRecord,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Workout history, newest first.
    fn history(&self) -> impl Future<Output = Result<Vec<WorkoutRecord>, StoreError>> + Send;
}
