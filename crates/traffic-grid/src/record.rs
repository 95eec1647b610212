//! Serializable record form of a [`Grid`].
//!
//! Shape (row-major, `cells[y][x]`):
//!
//! ```json
//! {"width": 3, "height": 1,
//!  "cells": [[{"color_state": 2, "is_active": true}, false, {"is_blue": true}]]}
//! ```
//!
//! Writers always emit the structured entry with both fields. Readers also
//! accept a bare boolean per cell and the historical `is_blue` key; a
//! boolean alone maps `true` to Barrier and `false` to Empty.

use serde::{Deserialize, Serialize};

use crate::cell::{Cell, ColorState};
use crate::error::GridError;
use crate::grid::{Grid, validate_dimensions};

/// Grid dimensions plus per-cell entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridRecord {
    /// Number of columns.
    pub width: i64,
    /// Number of rows.
    pub height: i64,
    /// `height` rows of `width` entries each.
    pub cells: Vec<Vec<CellEntry>>,
}

/// One persisted cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellEntry {
    /// Current format: explicit state plus the derived boolean.
    Structured {
        /// Three-way state; authoritative when present.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color_state: Option<ColorState>,
        /// Legacy boolean view, used only when `color_state` is missing.
        #[serde(default, alias = "is_blue", skip_serializing_if = "Option::is_none")]
        is_active: Option<bool>,
    },
    /// Oldest format: a bare boolean per cell.
    Legacy(bool),
}

impl CellEntry {
    /// Entry written for a cell in the current format.
    pub const fn from_cell(cell: &Cell) -> Self {
        Self::Structured {
            color_state: Some(cell.color()),
            is_active: Some(cell.is_active()),
        }
    }

    /// Resolve the entry to a color state.
    pub const fn color(self) -> ColorState {
        match self {
            Self::Structured {
                color_state: Some(color),
                ..
            } => color,
            Self::Structured {
                color_state: None,
                is_active: Some(true),
            }
            | Self::Legacy(true) => ColorState::Barrier,
            Self::Structured { .. } | Self::Legacy(false) => ColorState::Empty,
        }
    }
}

impl Grid {
    /// Convert to the serializable record form.
    pub fn to_record(&self) -> GridRecord {
        GridRecord {
            width: i64::try_from(self.width()).unwrap_or(i64::MAX),
            height: i64::try_from(self.height()).unwrap_or(i64::MAX),
            cells: self
                .rows()
                .map(|row| row.iter().map(CellEntry::from_cell).collect())
                .collect(),
        }
    }

    /// Rebuild a grid from its record form.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimensions`] for non-positive or
    /// oversized dimensions, or [`GridError::MalformedRecord`] when the
    /// number of rows or the length of any row disagrees with the declared
    /// dimensions. Both are checked before any cell is allocated.
    pub fn from_record(record: &GridRecord) -> Result<Self, GridError> {
        let (width, height) = validate_dimensions(record.width, record.height)?;
        if record.cells.len() != height {
            return Err(GridError::MalformedRecord {
                reason: format!("expected {height} rows, found {}", record.cells.len()),
            });
        }
        if let Some((y, row)) = record
            .cells
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != width)
        {
            return Err(GridError::MalformedRecord {
                reason: format!("row {y} has {} entries, expected {width}", row.len()),
            });
        }

        let mut grid = Self::blank(width, height);
        for (y, row) in record.cells.iter().enumerate() {
            for (x, entry) in row.iter().enumerate() {
                if let Some(cell) = grid.cell_at_mut(x, y) {
                    cell.set_color(entry.color());
                }
            }
        }
        Ok(grid)
    }
}

impl From<&Grid> for GridRecord {
    fn from(grid: &Grid) -> Self {
        grid.to_record()
    }
}

impl TryFrom<&GridRecord> for Grid {
    type Error = GridError;

    fn try_from(record: &GridRecord) -> Result<Self, Self::Error> {
        Self::from_record(record)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn mixed_grid() -> Grid {
        let mut grid = Grid::new(4, 3).unwrap();
        grid.set_color(0, 0, ColorState::Barrier).unwrap();
        grid.set_color(3, 0, ColorState::Active).unwrap();
        grid.set_color(1, 2, ColorState::Active).unwrap();
        grid.set_color(2, 1, ColorState::Barrier).unwrap();
        grid
    }

    #[test]
    fn round_trip_preserves_every_state() {
        let grid = mixed_grid();
        let restored = Grid::from_record(&grid.to_record()).unwrap();
        assert_eq!(restored, grid);
    }

    #[test]
    fn record_serializes_authoritative_shape() {
        let mut grid = Grid::new(2, 1).unwrap();
        grid.set_color(1, 0, ColorState::Active).unwrap();
        let json = serde_json::to_value(grid.to_record()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "width": 2,
                "height": 1,
                "cells": [[
                    {"color_state": 0, "is_active": false},
                    {"color_state": 2, "is_active": true}
                ]]
            })
        );
    }

    #[test]
    fn legacy_booleans_map_to_barrier() {
        let record: GridRecord = serde_json::from_str(
            r#"{"width": 2, "height": 2, "cells": [[true, false], [false, true]]}"#,
        )
        .unwrap();
        let grid = Grid::from_record(&record).unwrap();
        assert!(grid.get(0, 0).unwrap().is_barrier());
        assert!(grid.get(1, 0).unwrap().is_empty());
        assert!(grid.get(1, 1).unwrap().is_barrier());
        assert_eq!(grid.count_traffic(), 0);
    }

    #[test]
    fn structured_entry_fallbacks() {
        let record: GridRecord = serde_json::from_str(
            r#"{"width": 4, "height": 1, "cells": [[
                {"is_blue": true},
                {"is_active": true, "color_state": 2},
                {},
                {"color_state": 1, "is_active": false}
            ]]}"#,
        )
        .unwrap();
        let grid = Grid::from_record(&record).unwrap();
        assert!(grid.get(0, 0).unwrap().is_barrier());
        assert!(grid.get(1, 0).unwrap().is_active_traffic());
        assert!(grid.get(2, 0).unwrap().is_empty());
        assert!(grid.get(3, 0).unwrap().is_barrier());
    }

    #[test]
    fn invalid_color_state_fails_to_parse() {
        let parsed: Result<GridRecord, _> = serde_json::from_str(
            r#"{"width": 1, "height": 1, "cells": [[{"color_state": 9}]]}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn shape_mismatch_is_malformed() {
        let short_rows = GridRecord {
            width: 2,
            height: 2,
            cells: vec![vec![CellEntry::Legacy(true), CellEntry::Legacy(false)]],
        };
        assert!(matches!(
            Grid::from_record(&short_rows),
            Err(GridError::MalformedRecord { .. })
        ));

        let ragged = GridRecord {
            width: 2,
            height: 1,
            cells: vec![vec![CellEntry::Legacy(true)]],
        };
        assert!(matches!(
            Grid::from_record(&ragged),
            Err(GridError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn oversized_record_rejected_before_allocating() {
        let record = GridRecord {
            width: 1 << 60,
            height: 1,
            cells: vec![Vec::new()],
        };
        assert!(matches!(
            Grid::from_record(&record),
            Err(GridError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn ragged_row_reported_before_grid_is_built() {
        let record = GridRecord {
            width: 2,
            height: 2,
            cells: vec![
                vec![CellEntry::Legacy(true), CellEntry::Legacy(true)],
                vec![CellEntry::Legacy(true)],
            ],
        };
        let err = Grid::from_record(&record).unwrap_err();
        assert_eq!(
            err,
            GridError::MalformedRecord {
                reason: "row 1 has 1 entries, expected 2".to_owned()
            }
        );
    }

    #[test]
    fn non_positive_record_dimensions_rejected() {
        let record = GridRecord {
            width: 0,
            height: 1,
            cells: vec![Vec::new()],
        };
        assert!(matches!(
            Grid::from_record(&record),
            Err(GridError::InvalidDimensions { .. })
        ));
    }
}
