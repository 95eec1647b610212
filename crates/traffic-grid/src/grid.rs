//! Rectangular grid of cells indexed `[y][x]`.
//!
//! The [`Grid`] exclusively owns its cells. Public coordinates and
//! dimensions are signed so that callers passing raw UI input get a
//! [`GridError`] instead of a wrapped-around index; internally everything
//! is `usize` and every access is bounds-checked.

use std::fmt;

use tracing::debug;

use crate::cell::{Cell, ColorState};
use crate::error::GridError;

/// A rectangular collection of [`Cell`]s.
///
/// Invariants: `width > 0`, `height > 0`, `rows.len() == height`, every
/// row has `width` cells, and each cell's stored `(x, y)` equals its
/// position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    width: usize,
    height: usize,
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    /// Create a grid of the given size with every cell Empty.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimensions`] if either dimension is
    /// zero or negative, or the grid would exceed [`MAX_CELLS`].
    pub fn new(width: i64, height: i64) -> Result<Self, GridError> {
        let (w, h) = validate_dimensions(width, height)?;
        Ok(Self::blank(w, h))
    }

    /// Build an all-Empty grid from already validated dimensions.
    pub(crate) fn blank(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            rows: build_rows(width, height, Cell::new),
        }
    }

    /// Number of columns.
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells (`width * height`).
    pub const fn len(&self) -> usize {
        self.width.saturating_mul(self.height)
    }

    /// Always `false`; a grid has at least one cell.
    pub const fn is_empty(&self) -> bool {
        false
    }

    // -------------------------------------------------------------------
    // Access
    // -------------------------------------------------------------------

    /// Translate signed coordinates into in-bounds indices, if they are.
    pub fn contains(&self, x: i64, y: i64) -> Option<(usize, usize)> {
        let col = usize::try_from(x).ok().filter(|&c| c < self.width)?;
        let row = usize::try_from(y).ok().filter(|&r| r < self.height)?;
        Some((col, row))
    }

    fn locate(&self, x: i64, y: i64) -> Result<(usize, usize), GridError> {
        self.contains(x, y).ok_or(GridError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        })
    }

    /// Get the cell at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] if `x` is not in `[0, width)` or
    /// `y` is not in `[0, height)`.
    pub fn get(&self, x: i64, y: i64) -> Result<&Cell, GridError> {
        let (col, row) = self.locate(x, y)?;
        self.cell_at(col, row).ok_or(GridError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        })
    }

    /// Get a mutable reference to the cell at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] on coordinates outside the grid.
    pub fn get_mut(&mut self, x: i64, y: i64) -> Result<&mut Cell, GridError> {
        let (col, row) = self.locate(x, y)?;
        let (width, height) = (self.width, self.height);
        self.cell_at_mut(col, row).ok_or(GridError::OutOfBounds {
            x,
            y,
            width,
            height,
        })
    }

    /// Index-based lookup used by the evolution engine; `None` outside the grid.
    pub fn cell_at(&self, x: usize, y: usize) -> Option<&Cell> {
        self.rows.get(y).and_then(|row| row.get(x))
    }

    /// Mutable index-based lookup; `None` outside the grid.
    pub fn cell_at_mut(&mut self, x: usize, y: usize) -> Option<&mut Cell> {
        self.rows.get_mut(y).and_then(|row| row.get_mut(x))
    }

    /// Iterate over rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Iterate over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.rows.iter().flatten()
    }

    // -------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------

    /// Cycle the cell at `(x, y)`: Empty -> Barrier -> Active -> Empty.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] on coordinates outside the grid.
    pub fn cycle_cell(&mut self, x: i64, y: i64) -> Result<(), GridError> {
        self.get_mut(x, y)?.cycle();
        Ok(())
    }

    /// Legacy two-state flip of the cell at `(x, y)` between Empty and Barrier.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] on coordinates outside the grid.
    pub fn toggle_cell(&mut self, x: i64, y: i64) -> Result<(), GridError> {
        self.get_mut(x, y)?.toggle();
        Ok(())
    }

    /// Set the cell at `(x, y)` to `color`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] on coordinates outside the grid.
    pub fn set_color(&mut self, x: i64, y: i64, color: ColorState) -> Result<(), GridError> {
        self.get_mut(x, y)?.set_color(color);
        Ok(())
    }

    /// Resize in place, preserving cells whose position exists in both the
    /// old and new extents. Newly exposed positions are Empty.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimensions`] if either dimension is not
    /// positive or the grid would exceed [`MAX_CELLS`]. The grid is
    /// untouched in that case.
    pub fn resize(&mut self, new_width: i64, new_height: i64) -> Result<(), GridError> {
        let (w, h) = validate_dimensions(new_width, new_height)?;
        let rows = build_rows(w, h, |x, y| {
            self.cell_at(x, y).cloned().unwrap_or_else(|| Cell::new(x, y))
        });
        debug!(
            old_width = self.width,
            old_height = self.height,
            new_width = w,
            new_height = h,
            "Grid resized"
        );
        self.width = w;
        self.height = h;
        self.rows = rows;
        Ok(())
    }

    /// Reset every cell to Empty without changing dimensions.
    pub fn clear_all(&mut self) {
        self.rows.iter_mut().flatten().for_each(Cell::reset);
    }

    /// Produce a new grid of identical dimensions whose cell states are
    /// computed from this one. Coordinates carry over unchanged.
    pub fn map_states<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&Cell) -> ColorState,
    {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| Cell::with_color(cell.x(), cell.y(), f(cell)))
                    .collect()
            })
            .collect();
        Self {
            width: self.width,
            height: self.height,
            rows,
        }
    }

    // -------------------------------------------------------------------
    // Counting
    // -------------------------------------------------------------------

    /// Number of non-Empty cells (legacy "active" view: Barrier + Active).
    pub fn count_active(&self) -> usize {
        self.cells().filter(|c| c.is_active()).count()
    }

    /// Number of Barrier cells.
    pub fn count_barrier(&self) -> usize {
        self.cells().filter(|c| c.is_barrier()).count()
    }

    /// Number of Active (moving traffic) cells.
    pub fn count_traffic(&self) -> usize {
        self.cells().filter(|c| c.is_active_traffic()).count()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Grid({}x{}, {} active cells)",
            self.width,
            self.height,
            self.count_active()
        )
    }
}

/// Largest number of cells a grid may hold.
pub const MAX_CELLS: usize = 1 << 22;

/// Validate signed dimensions and convert them to `usize`.
///
/// Both must be positive and their product at most [`MAX_CELLS`].
pub(crate) fn validate_dimensions(width: i64, height: i64) -> Result<(usize, usize), GridError> {
    let invalid = || GridError::InvalidDimensions { width, height };
    let w = positive(width).ok_or_else(invalid)?;
    let h = positive(height).ok_or_else(invalid)?;
    w.checked_mul(h)
        .filter(|&cells| cells <= MAX_CELLS)
        .ok_or_else(invalid)?;
    Ok((w, h))
}

fn positive(value: i64) -> Option<usize> {
    usize::try_from(value).ok().filter(|&v| v > 0)
}

fn build_rows<F>(width: usize, height: usize, mut make: F) -> Vec<Vec<Cell>>
where
    F: FnMut(usize, usize) -> Cell,
{
    (0..height)
        .map(|y| (0..width).map(|x| make(x, y)).collect())
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn grid_with(width: i64, height: i64, cells: &[(i64, i64, ColorState)]) -> Grid {
        let mut grid = Grid::new(width, height).unwrap();
        for &(x, y, color) in cells {
            grid.set_color(x, y, color).unwrap();
        }
        grid
    }

    #[test]
    fn new_grid_is_all_empty_with_matching_coordinates() {
        let grid = Grid::new(4, 3).unwrap();
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.cells().count(), 12);
        assert_eq!(grid.len(), 12);
        for (y, row) in grid.rows().enumerate() {
            assert_eq!(row.len(), 4);
            for (x, cell) in row.iter().enumerate() {
                assert!(cell.is_empty());
                assert_eq!((cell.x(), cell.y()), (x, y));
            }
        }
    }

    #[test]
    fn non_positive_dimensions_rejected() {
        for (w, h) in [(0, 5), (5, 0), (-1, 3), (3, -7), (0, 0)] {
            assert_eq!(
                Grid::new(w, h),
                Err(GridError::InvalidDimensions { width: w, height: h })
            );
        }
    }

    #[test]
    fn oversized_dimensions_rejected() {
        let huge = 1_i64 << 60;
        assert_eq!(
            Grid::new(huge, 1),
            Err(GridError::InvalidDimensions { width: huge, height: 1 })
        );
        assert!(Grid::new(i64::MAX, i64::MAX).is_err());
        assert!(Grid::new(4096, 4096).is_err());
        assert_eq!(validate_dimensions(2048, 2048), Ok((2048, 2048)));
        assert!(validate_dimensions(2048, 2049).is_err());
    }

    #[test]
    fn oversized_resize_leaves_grid_untouched() {
        let mut grid = grid_with(3, 3, &[(1, 1, ColorState::Barrier)]);
        let before = grid.clone();
        assert!(matches!(
            grid.resize(1 << 60, 1),
            Err(GridError::InvalidDimensions { .. })
        ));
        assert_eq!(grid, before);
    }

    #[test]
    fn get_out_of_bounds() {
        let grid = Grid::new(5, 4).unwrap();
        assert!(matches!(grid.get(-1, 0), Err(GridError::OutOfBounds { .. })));
        assert!(matches!(grid.get(5, 0), Err(GridError::OutOfBounds { .. })));
        assert!(matches!(grid.get(0, 4), Err(GridError::OutOfBounds { .. })));
        assert!(matches!(grid.get(0, -1), Err(GridError::OutOfBounds { .. })));
        assert!(grid.get(4, 3).is_ok());
    }

    #[test]
    fn get_returns_same_cell() {
        let mut grid = Grid::new(3, 3).unwrap();
        grid.get_mut(1, 2).unwrap().cycle();
        let first: *const Cell = grid.get(1, 2).unwrap();
        let second: *const Cell = grid.get(1, 2).unwrap();
        assert_eq!(first, second);
        assert!(grid.get(1, 2).unwrap().is_barrier());
    }

    #[test]
    fn cycle_cell_propagates_bounds_error() {
        let mut grid = Grid::new(2, 2).unwrap();
        assert!(grid.cycle_cell(2, 0).is_err());
        grid.cycle_cell(1, 1).unwrap();
        grid.cycle_cell(1, 1).unwrap();
        assert!(grid.get(1, 1).unwrap().is_active_traffic());
    }

    #[test]
    fn toggle_cell_flips_between_empty_and_barrier() {
        let mut grid = Grid::new(2, 2).unwrap();
        grid.toggle_cell(0, 1).unwrap();
        assert!(grid.get(0, 1).unwrap().is_barrier());
        grid.toggle_cell(0, 1).unwrap();
        assert!(grid.get(0, 1).unwrap().is_empty());
        assert!(grid.toggle_cell(3, 3).is_err());
    }

    #[test]
    fn resize_grow_preserves_and_pads() {
        let mut grid = grid_with(
            2,
            2,
            &[(0, 0, ColorState::Barrier), (1, 1, ColorState::Active)],
        );
        grid.resize(4, 3).unwrap();
        assert_eq!((grid.width(), grid.height()), (4, 3));
        assert!(grid.get(0, 0).unwrap().is_barrier());
        assert!(grid.get(1, 1).unwrap().is_active_traffic());
        assert!(grid.get(3, 2).unwrap().is_empty());
        for cell in grid.cells() {
            assert_eq!(grid.cell_at(cell.x(), cell.y()), Some(cell));
        }
    }

    #[test]
    fn resize_shrink_then_grow_is_lossy() {
        let mut grid = grid_with(
            4,
            4,
            &[(1, 1, ColorState::Barrier), (3, 3, ColorState::Active)],
        );
        grid.resize(2, 2).unwrap();
        grid.resize(4, 4).unwrap();
        assert!(grid.get(1, 1).unwrap().is_barrier());
        assert!(grid.get(3, 3).unwrap().is_empty());
    }

    #[test]
    fn failed_resize_leaves_grid_untouched() {
        let mut grid = grid_with(3, 3, &[(2, 2, ColorState::Active)]);
        let before = grid.clone();
        assert!(grid.resize(0, 3).is_err());
        assert!(grid.resize(3, -2).is_err());
        assert_eq!(grid, before);
    }

    #[test]
    fn clear_all_keeps_dimensions() {
        let mut grid = grid_with(
            3,
            2,
            &[(0, 0, ColorState::Barrier), (2, 1, ColorState::Active)],
        );
        grid.clear_all();
        assert_eq!((grid.width(), grid.height()), (3, 2));
        assert!(grid.cells().all(Cell::is_empty));
    }

    #[test]
    fn counts_by_state() {
        let grid = grid_with(
            3,
            3,
            &[
                (0, 0, ColorState::Barrier),
                (1, 0, ColorState::Barrier),
                (2, 2, ColorState::Active),
            ],
        );
        assert_eq!(grid.count_active(), 3);
        assert_eq!(grid.count_barrier(), 2);
        assert_eq!(grid.count_traffic(), 1);
    }

    #[test]
    fn map_states_keeps_shape() {
        let grid = Grid::new(3, 2).unwrap();
        let next = grid.map_states(|_| ColorState::Active);
        assert_eq!((next.width(), next.height()), (3, 2));
        assert_eq!(next.count_traffic(), 6);
        assert_eq!(next.get(2, 1).unwrap().x(), 2);
    }

    #[test]
    fn display_reports_size_and_active_count() {
        let grid = grid_with(4, 2, &[(0, 0, ColorState::Active)]);
        assert_eq!(grid.to_string(), "Grid(4x2, 1 active cells)");
    }
}
