//! Shared state-action value store

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use crate::infra::{Action, NUM_ACTIONS};

use super::policy;

pub type ValueRow = [f64; NUM_ACTIONS];

/// Result of one Bellman backup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backup {
    pub old_value: f64,
    pub new_value: f64,
}

/// One row of four Q-values per grid cell, shared by every agent training on that grid.
///
/// Every write, including the read-modify-write of [`ValueTable::backup`], happens under a
/// single write lock, so no update is lost or observed half-applied. Plain reads take the
/// read lock.
#[derive(Debug, Default)]
pub struct ValueTable {
    rows: RwLock<Vec<ValueRow>>,
}

impl ValueTable {
    /// An empty table. Call [`ValueTable::initialize`] before use.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills `size` rows with independent uniform values in [0, 1).
    ///
    /// Returns false and leaves the table untouched if it is already populated.
    pub fn initialize(&self, size: usize, seed: u64) -> bool {
        let mut rows = self.write();
        if !rows.is_empty() {
            return false;
        }
        let mut rng = StdRng::seed_from_u64(seed);
        *rows = (0..size)
            .map(|_| std::array::from_fn(|_| rng.random::<f64>()))
            .collect();
        true
    }

    pub fn is_initialized(&self) -> bool {
        !self.read().is_empty()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn row(&self, cell: usize) -> ValueRow {
        self.read()[cell]
    }

    pub fn value(&self, cell: usize, action: Action) -> f64 {
        self.read()[cell][action.index()]
    }

    /// Highest-valued action at `cell`; ties go to the lowest action index.
    pub fn best_action(&self, cell: usize) -> Action {
        policy::greedy(&self.row(cell))
    }

    pub fn max_value(&self, cell: usize) -> f64 {
        let row = self.row(cell);
        row[policy::greedy(&row).index()]
    }

    /// Replaces a single entry.
    pub fn update(&self, cell: usize, action: Action, new_value: f64) {
        self.write()[cell][action.index()] = new_value;
    }

    /// One-step Q-learning update of `(cell, action)` towards
    /// `reward + discount * max Q(next_cell, ·)`, as one critical section.
    pub fn backup(
        &self,
        cell: usize,
        action: Action,
        next_cell: usize,
        reward: f64,
        learning_rate: f64,
        discount_factor: f64,
    ) -> Backup {
        let mut rows = self.write();
        let old_value = rows[cell][action.index()];
        let next_row = rows[next_cell];
        let max_next = next_row[policy::greedy(&next_row).index()];
        let new_value =
            old_value + learning_rate * (reward + discount_factor * max_next - old_value);
        rows[cell][action.index()] = new_value;
        drop(rows);

        trace!(
            "Q({}, {}) {:.4} -> {:.4} (reward {}, max next {:.4})",
            cell,
            action.as_str(),
            old_value,
            new_value,
            reward,
            max_next
        );
        Backup {
            old_value,
            new_value,
        }
    }

    /// Consistent copy of the whole table.
    pub fn snapshot(&self) -> Vec<ValueRow> {
        self.read().clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<ValueRow>> {
        // Writers never leave a row half-written, so a poisoned lock still holds valid data.
        self.rows.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<ValueRow>> {
        self.rows.write().unwrap_or_else(PoisonError::into_inner)
    }
}
