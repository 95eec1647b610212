//! Single grid cell and its three-way color state.
//!
//! A [`Cell`] holds one [`ColorState`]. The boolean `is_active` view
//! (Barrier or Active) is a read/write projection kept for two-state
//! callers and legacy save files; it never distinguishes Barrier from
//! Active.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GridError;

/// The three states a cell can be in.
///
/// Serialized as the integers `0`, `1`, `2` used by the save-file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum ColorState {
    /// Empty road (state 0).
    #[default]
    Empty,
    /// Static traffic barrier (state 1).
    Barrier,
    /// Moving traffic (state 2).
    Active,
}

impl ColorState {
    /// The next state in the click cycle: Empty -> Barrier -> Active -> Empty.
    pub const fn next(self) -> Self {
        match self {
            Self::Empty => Self::Barrier,
            Self::Barrier => Self::Active,
            Self::Active => Self::Empty,
        }
    }

    /// Integer code used in persisted records.
    pub const fn code(self) -> i64 {
        match self {
            Self::Empty => 0,
            Self::Barrier => 1,
            Self::Active => 2,
        }
    }

    /// Lowercase display name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Barrier => "barrier",
            Self::Active => "active",
        }
    }
}

impl TryFrom<i64> for ColorState {
    type Error = GridError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Empty),
            1 => Ok(Self::Barrier),
            2 => Ok(Self::Active),
            other => Err(GridError::InvalidState(other)),
        }
    }
}

impl From<ColorState> for i64 {
    fn from(state: ColorState) -> Self {
        state.code()
    }
}

impl fmt::Display for ColorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One grid unit.
///
/// The `x`/`y` coordinates are fixed at creation and always equal the
/// cell's position inside its owning [`Grid`](crate::Grid).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cell {
    x: usize,
    y: usize,
    color: ColorState,
}

impl Cell {
    /// Create an Empty cell at the given position.
    pub const fn new(x: usize, y: usize) -> Self {
        Self::with_color(x, y, ColorState::Empty)
    }

    /// Create a cell at the given position with an explicit state.
    pub const fn with_color(x: usize, y: usize, color: ColorState) -> Self {
        Self { x, y, color }
    }

    /// Column index.
    pub const fn x(&self) -> usize {
        self.x
    }

    /// Row index.
    pub const fn y(&self) -> usize {
        self.y
    }

    /// Current color state.
    pub const fn color(&self) -> ColorState {
        self.color
    }

    /// Advance the color state by one, modulo 3.
    pub const fn cycle(&mut self) {
        self.color = self.color.next();
    }

    /// Reset to Empty.
    pub const fn reset(&mut self) {
        self.color = ColorState::Empty;
    }

    /// Set the color state from its integer code.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidState`] if `state` is not 0, 1, or 2.
    /// The cell is left unchanged in that case.
    pub fn set_state(&mut self, state: i64) -> Result<(), GridError> {
        self.color = ColorState::try_from(state)?;
        Ok(())
    }

    /// Set the color state directly.
    pub const fn set_color(&mut self, color: ColorState) {
        self.color = color;
    }

    /// Whether the cell is Empty.
    pub const fn is_empty(&self) -> bool {
        matches!(self.color, ColorState::Empty)
    }

    /// Whether the cell is a Barrier.
    pub const fn is_barrier(&self) -> bool {
        matches!(self.color, ColorState::Barrier)
    }

    /// Whether the cell holds moving traffic (Active).
    pub const fn is_active_traffic(&self) -> bool {
        matches!(self.color, ColorState::Active)
    }

    /// Legacy boolean view: `true` for Barrier or Active.
    pub const fn is_active(&self) -> bool {
        !self.is_empty()
    }

    /// Legacy boolean setter: `true` forces Barrier, `false` forces Empty.
    pub const fn set_active(&mut self, active: bool) {
        self.color = if active {
            ColorState::Barrier
        } else {
            ColorState::Empty
        };
    }

    /// Legacy two-state flip between Empty and Barrier.
    ///
    /// An Active cell counts as "on" and flips to Empty.
    pub const fn toggle(&mut self) {
        self.set_active(!self.is_active());
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cell({}, {}, {})", self.x, self.y, self.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_cell_is_empty() {
        let cell = Cell::new(3, 4);
        assert_eq!(cell.x(), 3);
        assert_eq!(cell.y(), 4);
        assert!(cell.is_empty());
        assert!(!cell.is_active());
    }

    #[test]
    fn cycle_rotates_through_all_states() {
        let mut cell = Cell::new(0, 0);
        cell.cycle();
        assert!(cell.is_barrier());
        cell.cycle();
        assert!(cell.is_active_traffic());
        cell.cycle();
        assert!(cell.is_empty());
    }

    #[test]
    fn cycle_has_period_three_from_any_state() {
        for start in [ColorState::Empty, ColorState::Barrier, ColorState::Active] {
            let mut cell = Cell::with_color(1, 1, start);
            cell.cycle();
            cell.cycle();
            cell.cycle();
            assert_eq!(cell.color(), start);
        }
    }

    #[test]
    fn reset_is_idempotent() {
        let mut cell = Cell::with_color(0, 0, ColorState::Active);
        cell.reset();
        cell.reset();
        assert!(cell.is_empty());
    }

    #[test]
    fn set_state_rejects_out_of_range() {
        let mut cell = Cell::with_color(0, 0, ColorState::Barrier);
        assert_eq!(cell.set_state(3), Err(GridError::InvalidState(3)));
        assert_eq!(cell.set_state(-1), Err(GridError::InvalidState(-1)));
        assert!(cell.is_barrier());
        assert!(cell.set_state(2).is_ok());
        assert!(cell.is_active_traffic());
    }

    #[test]
    fn legacy_view_covers_barrier_and_active() {
        assert!(Cell::with_color(0, 0, ColorState::Barrier).is_active());
        assert!(Cell::with_color(0, 0, ColorState::Active).is_active());

        let mut cell = Cell::with_color(0, 0, ColorState::Active);
        cell.set_active(true);
        assert!(cell.is_barrier());
        cell.set_active(false);
        assert!(cell.is_empty());
    }

    #[test]
    fn toggle_ignores_active_state() {
        let mut cell = Cell::new(0, 0);
        cell.toggle();
        assert!(cell.is_barrier());
        cell.toggle();
        assert!(cell.is_empty());

        let mut traffic = Cell::with_color(0, 0, ColorState::Active);
        traffic.toggle();
        assert!(traffic.is_empty());
    }

    #[test]
    fn color_state_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&ColorState::Active).ok().as_deref(), Some("2"));
        let parsed: Result<ColorState, _> = serde_json::from_str("1");
        assert_eq!(parsed.ok(), Some(ColorState::Barrier));
        let bad: Result<ColorState, _> = serde_json::from_str("7");
        assert!(bad.is_err());
    }

    #[test]
    fn display_names_state() {
        let cell = Cell::with_color(2, 5, ColorState::Barrier);
        assert_eq!(cell.to_string(), "Cell(2, 5, barrier)");
    }
}
