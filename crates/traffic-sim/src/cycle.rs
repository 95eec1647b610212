//! Repeat detection over recent generations.
//!
//! Keeps a fixed-size ring of recent generations. A generation equal to one
//! already in the ring means the run has settled into a still life or an
//! oscillator with a period no longer than the ring. Hashes only narrow the
//! search; a repeat is confirmed by comparing whole grids.

use std::collections::VecDeque;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use traffic_grid::Grid;

/// Default number of generations remembered.
pub const DEFAULT_CYCLE_HISTORY: usize = 10;

/// Hash of a grid's dimensions and cell states.
pub fn grid_hash(grid: &Grid) -> u64 {
    let mut hasher = DefaultHasher::new();
    grid.hash(&mut hasher);
    hasher.finish()
}

/// Ring buffer of recent generations, keyed by hash.
#[derive(Debug, Clone)]
pub struct CycleDetector {
    history: VecDeque<(u64, Grid)>,
    capacity: usize,
}

impl Default for CycleDetector {
    fn default() -> Self {
        Self::new(DEFAULT_CYCLE_HISTORY)
    }
}

impl CycleDetector {
    /// Create a detector remembering `capacity` generations (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record `grid`. Returns `true` if it matches a remembered generation.
    pub fn observe(&mut self, grid: &Grid) -> bool {
        let hash = grid_hash(grid);
        if self
            .history
            .iter()
            .any(|(seen_hash, seen)| *seen_hash == hash && seen == grid)
        {
            return true;
        }
        if self.history.len() >= self.capacity {
            self.history.pop_front();
        }
        self.history.push_back((hash, grid.clone()));
        false
    }

    /// Forget all remembered generations.
    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Number of remembered generations.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Whether nothing is remembered.
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use traffic_grid::ColorState;

    use super::*;
    use crate::evolution::advance;

    #[test]
    fn still_life_detected_on_second_observation() {
        let mut grid = Grid::new(4, 4).unwrap();
        for (x, y) in [(1, 1), (2, 1), (1, 2), (2, 2)] {
            grid.set_color(x, y, ColorState::Active).unwrap();
        }
        let mut detector = CycleDetector::default();
        assert!(!detector.observe(&grid));
        assert!(detector.observe(&advance(&grid)));
    }

    #[test]
    fn oscillator_detected_after_period() {
        let mut grid = Grid::new(5, 5).unwrap();
        for x in 1..=3 {
            grid.set_color(x, 2, ColorState::Active).unwrap();
        }
        let mut detector = CycleDetector::default();
        assert!(!detector.observe(&grid));
        let step1 = advance(&grid);
        assert!(!detector.observe(&step1));
        assert!(detector.observe(&advance(&step1)));
    }

    #[test]
    fn ring_forgets_oldest() {
        let mut detector = CycleDetector::new(2);
        let a = Grid::new(1, 1).unwrap();
        let b = Grid::new(2, 1).unwrap();
        let c = Grid::new(3, 1).unwrap();
        assert!(!detector.observe(&a));
        assert!(!detector.observe(&b));
        assert!(!detector.observe(&c));
        assert_eq!(detector.len(), 2);
        assert!(!detector.observe(&a));
    }

    #[test]
    fn matching_hash_alone_is_not_a_repeat() {
        let grid = Grid::new(3, 3).unwrap();
        let mut other = grid.clone();
        other.set_color(1, 1, ColorState::Barrier).unwrap();

        let mut detector = CycleDetector::default();
        // Plant a remembered generation that shares the hash but not the cells.
        detector.history.push_back((grid_hash(&other), grid));
        assert!(!detector.observe(&other));
        assert!(detector.observe(&other));
    }

    #[test]
    fn reset_clears_history() {
        let grid = Grid::new(2, 2).unwrap();
        let mut detector = CycleDetector::default();
        detector.observe(&grid);
        detector.reset();
        assert!(detector.is_empty());
        assert!(!detector.observe(&grid));
    }
}
