use std::future::Future;
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use super::{Profile, ProfileStore, ProfileUpdate, WorkoutRecord};
use crate::error::StoreError;

#[derive(Debug, Default)]
struct Inner {
    profile: Option<Profile>,
    history: Vec<WorkoutRecord>,
    /// Number of upcoming calls that fail with a transport error.
    failures: u32,
}

/// In-memory profile store.
///
/// Can be told to fail the next calls, to exercise the non-fatal save paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(profile: Profile) -> Self {
        Self {
            inner: Mutex::new(Inner {
                profile: Some(profile),
                ..Default::default()
            }),
        }
    }

    /// Fail the next `count` calls with [`StoreError::Transport`].
    pub fn fail_next(&self, count: u32) {
        self.lock().failures = count;
    }

    pub fn profile(&self) -> Option<Profile> {
        self.lock().profile.clone()
    }

    pub fn records(&self) -> Vec<WorkoutRecord> {
        self.lock().history.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned lock only means a test panicked mid-call; the data is still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check(inner: &mut Inner) -> Result<(), StoreError> {
        if inner.failures > 0 {
            inner.failures -= 1;
            debug!(remaining = inner.failures, "injected store failure");
            return Err(StoreError::Transport("injected failure".into()));
        }
        Ok(())
    }
}

impl ProfileStore for MemoryStore {
    fn current_profile(&self) -> impl Future<Output = Result<Profile, StoreError>> + Send {
        let result = {
            let mut inner = self.lock();
            Self::check(&mut inner).and_then(|_| inner.profile.clone().ok_or(StoreError::ProfileNotFound))
        };
        async move { result }
    }

    fn update_profile(
        &self,
        update: ProfileUpdate,
    ) -> impl Future<Output = Result<Profile, StoreError>> + Send {
        let result = {
            let mut inner = self.lock();
            Self::check(&mut inner).and_then(|_| {
                let profile = inner.profile.as_mut().ok_or(StoreError::ProfileNotFound)?;
                profile.apply(&update);
                Ok(profile.clone())
            })
        };
        async move { result }
    }

    fn append_history(
        &self,
        record: WorkoutRecord,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        let result = {
            let mut inner = self.lock();
            Self::check(&mut inner).map(|_| inner.history.insert(0, record))
        };
        async move { result }
    }

    fn history(&self) -> impl Future<Output = Result<Vec<WorkoutRecord>, StoreError>> + Send {
        let result = {
            let mut inner = self.lock();
            Self::check(&mut inner).map(|_| inner.history.clone())
        };
        async move { result }
    }
}
