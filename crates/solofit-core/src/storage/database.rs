//! SQLite-backed local profile store.
//!
//! Provides persistent storage for:
//! - The single local user profile
//! - Workout history, newest first

use std::future::Future;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::data_dir;
use crate::error::{CoreError, StoreError};
use crate::profile::{Profile, ProfileStore, ProfileUpdate, WorkoutRecord};

/// SQLite database holding the local profile and its workout history.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open the database at `~/.config/solofit/solofit.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory is unavailable or the
    /// database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("solofit.db");
        Ok(Self::open_at(&path)?)
    }

    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        Self::with_connection(Connection::open(path)?)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn().execute_batch(
            "CREATE TABLE IF NOT EXISTS profiles (
                id          TEXT PRIMARY KEY,
                data        TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS workout_history (
                id            TEXT PRIMARY KEY,
                user_id       TEXT NOT NULL,
                name          TEXT NOT NULL,
                kind          TEXT NOT NULL,
                performed_at  TEXT NOT NULL,
                duration_secs INTEGER NOT NULL,
                points_earned INTEGER NOT NULL,
                completed     INTEGER NOT NULL,
                data          TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_history_performed_at ON workout_history(performed_at);
            CREATE INDEX IF NOT EXISTS idx_history_user ON workout_history(user_id);",
        )
    }

    // ── Profile ──────────────────────────────────────────────────────

    /// The local profile, if one was created.
    pub fn load_profile(&self) -> Result<Option<Profile>, StoreError> {
        let data: Option<String> = self
            .conn()
            .query_row(
                "SELECT data FROM profiles ORDER BY updated_at DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(data.map(|d| serde_json::from_str(&d)).transpose()?)
    }

    /// Insert or replace the profile with the same id.
    pub fn save_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        let data = serde_json::to_string(profile)?;
        self.conn().execute(
            "INSERT INTO profiles (id, data, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
            params![profile.id, data, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Load the local profile, creating a fresh one on first use.
    pub fn ensure_profile(&self) -> Result<Profile, StoreError> {
        if let Some(profile) = self.load_profile()? {
            return Ok(profile);
        }
        let profile = Profile::new(uuid::Uuid::new_v4().to_string());
        self.save_profile(&profile)?;
        debug!(id = %profile.id, "created local profile");
        Ok(profile)
    }

    pub fn apply_update(&self, update: &ProfileUpdate) -> Result<Profile, StoreError> {
        let mut profile = self.load_profile()?.ok_or(StoreError::ProfileNotFound)?;
        profile.apply(update);
        self.save_profile(&profile)?;
        Ok(profile)
    }

    // ── History ──────────────────────────────────────────────────────

    pub fn insert_record(&self, record: &WorkoutRecord) -> Result<(), StoreError> {
        let data = serde_json::to_string(record)?;
        self.conn().execute(
            "INSERT INTO workout_history
                (id, user_id, name, kind, performed_at, duration_secs, points_earned, completed, data)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.id,
                record.user_id,
                record.name,
                record.kind.as_str(),
                record.performed_at.to_rfc3339(),
                record.duration_secs as i64,
                record.points_earned,
                record.completed,
                data,
            ],
        )?;
        Ok(())
    }

    /// Every record, newest first.
    pub fn records(&self) -> Result<Vec<WorkoutRecord>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT data FROM workout_history ORDER BY performed_at DESC, rowid DESC",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut records = Vec::new();
        for data in rows {
            records.push(serde_json::from_str(&data?)?);
        }
        Ok(records)
    }
}

impl ProfileStore for Database {
    fn current_profile(&self) -> impl Future<Output = Result<Profile, StoreError>> + Send {
        let result = self
            .load_profile()
            .and_then(|p| p.ok_or(StoreError::ProfileNotFound));
        async move { result }
    }

    fn update_profile(
        &self,
        update: ProfileUpdate,
    ) -> impl Future<Output = Result<Profile, StoreError>> + Send {
        let result = self.apply_update(&update);
        async move { result }
    }

    fn append_history(
        &self,
        record: WorkoutRecord,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        let result = self.insert_record(&record);
        async move { result }
    }

    fn history(&self) -> impl Future<Output = Result<Vec<WorkoutRecord>, StoreError>> + Send {
        let result = self.records();
        async move { result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::Rank;
    use crate::session::SessionKind;
    use chrono::{Duration, TimeZone};

    fn record(id: &str, user: &str, minutes_ago: i64) -> WorkoutRecord {
        WorkoutRecord {
            id: id.into(),
            user_id: user.into(),
            name: "Full Body Challenge".into(),
            kind: SessionKind::Workout,
            performed_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
                - Duration::minutes(minutes_ago),
            duration_secs: 1500,
            points_earned: 15,
            completed: true,
            rank: None,
            feedback: None,
            exercises: vec![],
        }
    }

    #[test]
    fn ensure_profile_is_stable() {
        let db = Database::open_memory().unwrap();
        assert!(db.load_profile().unwrap().is_none());
        let first = db.ensure_profile().unwrap();
        let second = db.ensure_profile().unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.rank, Rank::E);
    }

    #[test]
    fn update_requires_profile() {
        let db = Database::open_memory().unwrap();
        let err = db.apply_update(&ProfileUpdate::default()).unwrap_err();
        assert!(matches!(err, StoreError::ProfileNotFound));
    }

    #[test]
    fn update_persists_fields() {
        let db = Database::open_memory().unwrap();
        db.ensure_profile().unwrap();
        db.apply_update(&ProfileUpdate {
            name: Some("Sam".into()),
            points: Some(120),
            rank: Some(Rank::D),
            ..Default::default()
        })
        .unwrap();
        let profile = db.load_profile().unwrap().unwrap();
        assert_eq!(profile.name.as_deref(), Some("Sam"));
        assert_eq!(profile.points, 120);
        assert_eq!(profile.rank, Rank::D);
    }

    #[test]
    fn records_come_back_newest_first() {
        let db = Database::open_memory().unwrap();
        db.insert_record(&record("old", "u", 60)).unwrap();
        db.insert_record(&record("new", "u", 0)).unwrap();
        db.insert_record(&record("mid", "u", 30)).unwrap();
        let ids: Vec<_> = db.records().unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, ["new", "mid", "old"]);
    }

    #[test]
    fn duplicate_record_id_is_rejected() {
        let db = Database::open_memory().unwrap();
        db.insert_record(&record("a", "u", 0)).unwrap();
        assert!(matches!(
            db.insert_record(&record("a", "u", 5)),
            Err(StoreError::Database(_))
        ));
    }

    #[tokio::test]
    async fn implements_profile_store() {
        let db = Database::open_memory().unwrap();
        assert!(matches!(
            db.current_profile().await,
            Err(StoreError::ProfileNotFound)
        ));
        db.ensure_profile().unwrap();
        let profile = db
            .update_profile(ProfileUpdate {
                points: Some(15),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(profile.points, 15);
        db.append_history(record("r1", &profile.id, 0)).await.unwrap();
        assert_eq!(db.history().await.unwrap().len(), 1);
    }
}
