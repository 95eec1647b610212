//! Click-drag painting as an explicit state machine.
//!
//! ```text
//!   Idle --down--> Dragging --enter--> Dragging --up--> Idle (commit)
//!                  Dragging --down--> Dragging (previous drag abandoned)
//! ```
//!
//! Out-of-bounds coordinates are dropped silently at every step; this is a
//! pointer-ergonomics policy and lives here, not in [`Grid`]. On commit
//! every distinct cell in the drag path is cycled exactly once, no matter
//! how many times the pointer revisited it.

use std::collections::BTreeSet;

use tracing::debug;
use traffic_grid::Grid;

/// Drag state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    /// No button held.
    #[default]
    Idle,
    /// Button held; cells visited so far.
    Dragging {
        /// Where the drag began, if that point was inside the grid.
        origin: Option<(usize, usize)>,
        /// Visited in-bounds cells in order, consecutive repeats removed.
        path: Vec<(usize, usize)>,
    },
}

/// Translates pointer gestures into grid edits.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    /// Create an idle controller.
    pub const fn new() -> Self {
        Self {
            state: DragState::Idle,
        }
    }

    /// Current state.
    pub const fn state(&self) -> &DragState {
        &self.state
    }

    /// Whether a drag is in progress.
    pub const fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// The path recorded so far; empty when idle.
    pub fn path(&self) -> &[(usize, usize)] {
        match &self.state {
            DragState::Dragging { path, .. } => path,
            DragState::Idle => &[],
        }
    }

    /// Abandon any drag in progress without touching the grid.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    /// Start a drag at `(x, y)`. A drag already in progress is abandoned.
    pub fn mouse_down(&mut self, x: i64, y: i64, grid: &Grid) {
        if let DragState::Dragging { path, .. } = &self.state {
            debug!(abandoned_cells = path.len(), "Drag restarted before release");
        }
        let origin = grid.contains(x, y);
        self.state = DragState::Dragging {
            origin,
            path: origin.into_iter().collect(),
        };
    }

    /// Extend the drag path with `(x, y)`. Ignored while idle.
    pub fn mouse_enter(&mut self, x: i64, y: i64, grid: &Grid) {
        if let DragState::Dragging { path, .. } = &mut self.state {
            push_distinct(path, grid.contains(x, y));
        }
    }

    /// Finish the drag at `(x, y)` and cycle every distinct visited cell
    /// once. Ignored while idle. Returns the number of cells cycled.
    pub fn mouse_up(&mut self, x: i64, y: i64, grid: &mut Grid) -> usize {
        let DragState::Dragging { mut path, .. } = std::mem::take(&mut self.state) else {
            return 0;
        };
        push_distinct(&mut path, grid.contains(x, y));

        let mut seen = BTreeSet::new();
        let mut cycled: usize = 0;
        for (cx, cy) in path {
            if !seen.insert((cx, cy)) {
                continue;
            }
            // The grid may have shrunk since the cell was recorded.
            if let Some(cell) = grid.cell_at_mut(cx, cy) {
                cell.cycle();
                cycled = cycled.saturating_add(1);
            }
        }
        debug!(cells = cycled, "Drag committed");
        cycled
    }
}

fn push_distinct(path: &mut Vec<(usize, usize)>, point: Option<(usize, usize)>) {
    if let Some(point) = point
        && path.last() != Some(&point)
    {
        path.push(point);
    }
}
