//! Named seed patterns of Active cells.

use crate::cell::ColorState;
use crate::grid::Grid;

/// A named set of Active cells, as `(x, y)` offsets from the pattern origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern {
    /// Lowercase pattern name.
    pub name: &'static str,
    /// Active cells relative to the origin.
    pub cells: &'static [(usize, usize)],
}

/// Built-in patterns.
pub const PATTERNS: &[Pattern] = &[
    Pattern {
        name: "block",
        cells: &[(0, 0), (1, 0), (0, 1), (1, 1)],
    },
    Pattern {
        name: "blinker",
        cells: &[(0, 1), (1, 1), (2, 1)],
    },
    Pattern {
        name: "toad",
        cells: &[(1, 0), (2, 0), (3, 0), (0, 1), (1, 1), (2, 1)],
    },
    Pattern {
        name: "beacon",
        cells: &[(0, 0), (1, 0), (0, 1), (1, 1), (2, 2), (3, 2), (2, 3), (3, 3)],
    },
    Pattern {
        name: "glider",
        cells: &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)],
    },
];

/// Look up a built-in pattern by name, ignoring case.
pub fn find(name: &str) -> Option<&'static Pattern> {
    PATTERNS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

impl Pattern {
    /// Set this pattern's cells to Active with its origin at
    /// `(offset_x, offset_y)`. Cells falling outside the grid are skipped.
    ///
    /// Returns the number of cells placed.
    pub fn stamp(&self, grid: &mut Grid, offset_x: i64, offset_y: i64) -> usize {
        self.cells
            .iter()
            .filter_map(|&(dx, dy)| {
                let x = offset_x.checked_add(i64::try_from(dx).ok()?)?;
                let y = offset_y.checked_add(i64::try_from(dy).ok()?)?;
                grid.set_color(x, y, ColorState::Active).ok()
            })
            .count()
    }
}
