//! Shared step/track activation grid.
//!
//! The UI thread toggles single cells while the clock thread snapshots
//! whole rows, so every access goes through one mutex and hands out copies,
//! never references into the grid. A poisoned lock is recovered rather than
//! propagated: a half-finished toggle is still a valid grid.

use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use crate::shared::{NUM_STEPS, NUM_TRACKS};

type Grid = [[bool; NUM_TRACKS]; NUM_STEPS];

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PatternError {
    #[error(
        "cell ({step}, {track}) outside the {steps}x{tracks} grid",
        steps = NUM_STEPS,
        tracks = NUM_TRACKS
    )]
    OutOfRange { step: usize, track: usize },
}

#[derive(Debug, Default)]
pub struct PatternStore {
    grid: Mutex<Grid>,
}

impl PatternStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Grid> {
        self.grid.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Flip one cell, returning its new state.
    pub fn toggle(&self, step: usize, track: usize) -> Result<bool, PatternError> {
        if step >= NUM_STEPS || track >= NUM_TRACKS {
            return Err(PatternError::OutOfRange { step, track });
        }
        let mut grid = self.lock();
        grid[step][track] = !grid[step][track];
        Ok(grid[step][track])
    }

    /// Copy of the track flags at one step. The copy is taken under the
    /// lock, so it can never observe a row mid-toggle.
    pub fn snapshot_row(&self, step: usize) -> Result<[bool; NUM_TRACKS], PatternError> {
        if step >= NUM_STEPS {
            return Err(PatternError::OutOfRange { step, track: 0 });
        }
        Ok(self.lock()[step])
    }

    /// Copy of the whole grid, for rendering.
    pub fn snapshot(&self) -> Grid {
        *self.lock()
    }

    /// Reset every cell to inactive.
    pub fn clear(&self) {
        *self.lock() = Grid::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn toggle_flips_and_reports_new_state() {
        let store = PatternStore::new();
        assert_eq!(store.toggle(0, 3), Ok(true));
        assert_eq!(store.toggle(0, 3), Ok(false));
        assert_eq!(store.toggle(15, 7), Ok(true));
    }

    #[test]
    fn out_of_range_cells_are_rejected() {
        let store = PatternStore::new();
        assert_eq!(
            store.toggle(16, 0),
            Err(PatternError::OutOfRange { step: 16, track: 0 })
        );
        assert_eq!(
            store.toggle(0, 8),
            Err(PatternError::OutOfRange { step: 0, track: 8 })
        );
        assert!(store.snapshot_row(16).is_err());
        // nothing was written
        assert_eq!(store.snapshot(), Grid::default());
    }

    #[test]
    fn snapshots_are_copies_not_views() {
        let store = PatternStore::new();
        store.toggle(4, 2).unwrap();
        let row = store.snapshot_row(4).unwrap();
        store.toggle(4, 2).unwrap();
        assert!(row[2], "row snapshot changed after a later toggle");
    }

    #[test]
    fn clear_resets_every_cell() {
        let store = PatternStore::new();
        for step in 0..NUM_STEPS {
            store.toggle(step, step % NUM_TRACKS).unwrap();
        }
        store.clear();
        assert_eq!(store.snapshot(), Grid::default());
    }

    #[test]
    fn concurrent_toggles_settle_to_parity() {
        let store = Arc::new(PatternStore::new());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                for _ in 0..500 {
                    store.toggle(7, 1).unwrap();
                    let _ = store.snapshot_row(7).unwrap();
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        // 4 threads x 500 toggles = even count, so the cell is back off
        assert!(!store.snapshot_row(7).unwrap()[1]);
    }
}
