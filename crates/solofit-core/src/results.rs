//! Persisting a finished session.
//!
//! Saving never touches the session itself: whatever happens here, the
//! score stays on screen and the user may retry or leave without saving.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::profile::{Profile, ProfileStore, ProfileUpdate, WorkoutRecord};
use crate::session::{SessionKind, SessionSummary};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SaveStatus {
    /// Profile and history both written.
    Saved { profile: Profile, record_id: String },
    /// Profile updated, history record lost. Do not retry: points were applied.
    ProfileOnly { profile: Profile, reason: String },
    /// Nothing was written. Safe to retry.
    Failed { reason: String },
}

impl SaveStatus {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveStatus::Saved { .. })
    }

    pub fn can_retry(&self) -> bool {
        matches!(self, SaveStatus::Failed { .. })
    }
}

/// Profile changes a finished session earns.
///
/// Both kinds add their points. An evaluation sets the rank it measured;
/// a workout climbs the rank ladder by total points.
pub fn profile_update(profile: &Profile, summary: &SessionSummary) -> ProfileUpdate {
    let points = profile.points.saturating_add(summary.points());
    let rank = match (summary.kind, summary.score.as_ref().and_then(|s| s.rank)) {
        (SessionKind::Evaluation, Some(rank)) => rank,
        _ => profile.rank.promote(points),
    };
    ProfileUpdate {
        rank: Some(rank),
        points: Some(points),
        ..Default::default()
    }
}

/// Write the outcome of a completed session to `store`.
pub async fn save_results<P: ProfileStore>(store: &P, summary: &SessionSummary) -> SaveStatus {
    if !summary.completed {
        return SaveStatus::Failed {
            reason: "session is not completed".into(),
        };
    }

    let current = match store.current_profile().await {
        Ok(profile) => profile,
        Err(e) => {
            warn!(error = %e, "could not load profile");
            return SaveStatus::Failed {
                reason: e.to_string(),
            };
        }
    };

    let update = profile_update(&current, summary);
    let profile = match store.update_profile(update).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!(error = %e, "could not update profile");
            return SaveStatus::Failed {
                reason: e.to_string(),
            };
        }
    };

    let record = WorkoutRecord::from_summary(&profile.id, summary);
    let record_id = record.id.clone();
    match store.append_history(record).await {
        Ok(()) => {
            info!(record = %record_id, points = profile.points, rank = %profile.rank, "session saved");
            SaveStatus::Saved { profile, record_id }
        }
        Err(e) => {
            warn!(error = %e, "could not append workout history");
            SaveStatus::ProfileOnly {
                profile,
                reason: e.to_string(),
            }
        }
    }
}
