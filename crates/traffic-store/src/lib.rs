//! JSON file persistence for Conway traffic grids.
//!
//! Grids are stored as UTF-8 JSON in the [`GridRecord`] shape. Saving
//! writes a sibling temporary file and renames it over the target, so a
//! failed save never leaves a half-written grid behind. Every file handle
//! is scoped to the call that opened it.
//!
//! [`GridRecord`]: traffic_grid::GridRecord

pub mod error;
pub mod grid_file;

pub use error::StoreError;
pub use grid_file::{DEFAULT_SAVE_PATH, GridFile, decode, encode};
