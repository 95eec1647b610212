//! One generation of the traffic variant of Conway's Game of Life.
//!
//! Rules, applied to every cell against the *previous* generation:
//!
//! - Barrier cells never change and are invisible to neighbor counts.
//! - Active cells survive with 2 or 3 Active neighbors, otherwise empty out.
//! - Empty cells become Active with exactly 3 Active neighbors.
//!
//! Neighbors are the eight Moore-neighborhood cells. The grid does not wrap;
//! positions outside it count as Empty.

use traffic_grid::{ColorState, Grid};

/// Offsets of the eight Moore neighbors.
const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Compute the next generation. The input is not modified; the result has
/// identical dimensions.
pub fn advance(grid: &Grid) -> Grid {
    grid.map_states(|cell| {
        next_state(cell.color(), active_neighbors(grid, cell.x(), cell.y()))
    })
}

/// Number of Active cells among the eight neighbors of `(x, y)`.
pub fn active_neighbors(grid: &Grid, x: usize, y: usize) -> u8 {
    NEIGHBOR_OFFSETS
        .iter()
        .filter_map(|&(dx, dy)| {
            let nx = x.checked_add_signed(dx)?;
            let ny = y.checked_add_signed(dy)?;
            grid.cell_at(nx, ny)
        })
        .filter(|neighbor| neighbor.is_active_traffic())
        .fold(0_u8, |count, _| count.saturating_add(1))
}

/// Transition for a single cell given its Active neighbor count.
pub const fn next_state(current: ColorState, active_neighbors: u8) -> ColorState {
    match (current, active_neighbors) {
        (ColorState::Barrier, _) => ColorState::Barrier,
        (ColorState::Active, 2 | 3) | (ColorState::Empty, 3) => ColorState::Active,
        _ => ColorState::Empty,
    }
}
