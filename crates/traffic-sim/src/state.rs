//! Grid state shared between the session and the tick driver.
//!
//! The grid lives behind a single [`RwLock`]. Every step and every user
//! edit takes the write lock for its whole duration, so readers observe
//! either the previous generation or the complete new one.

use std::sync::Arc;

use tokio::sync::RwLock;
use traffic_grid::Grid;

use crate::evolution;

/// Shared handle to the live grid state.
pub type SharedGrid = Arc<RwLock<GridState>>;

/// Counts reported after each generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepSummary {
    /// Generation number after the step.
    pub generation: u64,
    /// Non-Empty cells (Barrier + Active).
    pub active: usize,
    /// Barrier cells.
    pub barrier: usize,
    /// Active (traffic) cells.
    pub traffic: usize,
    /// Whether any cell changed in this step.
    pub changed: bool,
}

/// The live grid plus bookkeeping about how it got there.
#[derive(Debug, Clone)]
pub struct GridState {
    grid: Grid,
    generation: u64,
    edit_epoch: u64,
}

impl GridState {
    /// Wrap a grid at generation 0.
    pub const fn new(grid: Grid) -> Self {
        Self {
            grid,
            generation: 0,
            edit_epoch: 0,
        }
    }

    /// Wrap a grid in a fresh shared handle.
    pub fn shared(grid: Grid) -> SharedGrid {
        Arc::new(RwLock::new(Self::new(grid)))
    }

    /// The current grid.
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Generations advanced since the last clear, load, or reseed.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Counter bumped on every user edit; lets the tick driver notice
    /// that the grid changed outside the evolution rule.
    pub const fn edit_epoch(&self) -> u64 {
        self.edit_epoch
    }

    /// Apply a user edit to the grid.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut Grid) -> R) -> R {
        self.edit_epoch = self.edit_epoch.wrapping_add(1);
        f(&mut self.grid)
    }

    /// Replace the grid wholesale and restart the generation count.
    pub fn replace(&mut self, grid: Grid) {
        self.grid = grid;
        self.generation = 0;
        self.edit_epoch = self.edit_epoch.wrapping_add(1);
    }

    /// Restart the generation count without touching cells.
    pub const fn reset_generation(&mut self) {
        self.generation = 0;
    }

    /// Advance one generation in place of the old grid.
    pub fn step(&mut self) -> StepSummary {
        let next = evolution::advance(&self.grid);
        let changed = next != self.grid;
        self.grid = next;
        self.generation = self.generation.saturating_add(1);
        StepSummary {
            changed,
            ..self.summary()
        }
    }

    /// Counts for the current grid; `changed` is always `false`.
    pub fn summary(&self) -> StepSummary {
        StepSummary {
            generation: self.generation,
            active: self.grid.count_active(),
            barrier: self.grid.count_barrier(),
            traffic: self.grid.count_traffic(),
            changed: false,
        }
    }
}
