//! Per-set completion bookkeeping and the live rep counter.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::program::Program;
use crate::scoring::completion_pct;

/// Which sets of each exercise are done.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionLedger {
    sets: BTreeMap<String, Vec<bool>>,
}

impl CompletionLedger {
    /// One open cell per set of every exercise in `program`.
    pub fn for_program(program: &Program) -> Self {
        let sets = program
            .exercises()
            .iter()
            .map(|e| (e.id.clone(), vec![false; e.sets as usize]))
            .collect();
        Self { sets }
    }

    /// Mark one set done. Returns true only if the cell changed.
    pub fn mark(&mut self, exercise_id: &str, set: usize) -> bool {
        match self.sets.get_mut(exercise_id).and_then(|s| s.get_mut(set)) {
            Some(cell) if !*cell => {
                *cell = true;
                true
            }
            _ => false,
        }
    }

    pub fn is_done(&self, exercise_id: &str, set: usize) -> bool {
        self.sets
            .get(exercise_id)
            .and_then(|s| s.get(set))
            .copied()
            .unwrap_or(false)
    }

    /// Progress dots for one exercise.
    pub fn sets_for(&self, exercise_id: &str) -> &[bool] {
        self.sets.get(exercise_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn completed_sets(&self) -> u32 {
        self.sets.values().flatten().filter(|done| **done).count() as u32
    }

    pub fn completed_sets_for(&self, exercise_id: &str) -> u32 {
        self.sets_for(exercise_id).iter().filter(|done| **done).count() as u32
    }

    pub fn total_sets(&self) -> u32 {
        self.sets.values().map(|s| s.len() as u32).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.sets.values().flatten().all(|done| *done)
    }

    /// 0 ..= 100, reaching 100 only when every set is done.
    pub fn completion_pct(&self) -> u8 {
        completion_pct(self.completed_sets(), self.total_sets())
    }
}

/// Rep counter for an open-ended interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepCounter(u32);

impl RepCounter {
    pub fn value(self) -> u32 {
        self.0
    }

    pub fn increment(&mut self) -> u32 {
        self.0 = self.0.saturating_add(1);
        self.0
    }

    /// Saturates at zero.
    pub fn decrement(&mut self) -> u32 {
        self.0 = self.0.saturating_sub(1);
        self.0
    }

    pub fn set(&mut self, value: u32) {
        self.0 = value;
    }
}
