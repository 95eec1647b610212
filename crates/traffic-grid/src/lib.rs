//! Cell and grid model for the Conway traffic simulation.
//!
//! A grid is a rectangle of cells, each Empty, Barrier, or Active. Cells are
//! edited by cycling through the three states, counted per state, and
//! converted to and from a serializable record for persistence.
//!
//! # Modules
//!
//! - [`cell`] -- [`Cell`] and its three-way [`ColorState`], plus the legacy
//!   boolean view.
//! - [`error`] -- Error types for grid operations.
//! - [`grid`] -- [`Grid`]: bounds-checked access, resize with preservation,
//!   clearing, and counting.
//! - [`pattern`] -- Named seed patterns stamped as Active cells.
//! - [`record`] -- [`GridRecord`] / [`CellEntry`], the persisted shape,
//!   including legacy boolean entries.

pub mod cell;
pub mod error;
pub mod grid;
pub mod pattern;
pub mod record;

// Re-export primary types at crate root.
pub use cell::{Cell, ColorState};
pub use error::GridError;
pub use grid::{Grid, MAX_CELLS};
pub use pattern::{PATTERNS, Pattern};
pub use record::{CellEntry, GridRecord};
