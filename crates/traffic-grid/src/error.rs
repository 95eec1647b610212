//! Error types for the `traffic-grid` crate.
//!
//! All fallible operations in this crate return [`GridError`].

/// Errors that can occur during cell and grid operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// Grid dimensions must both be strictly positive and within the
    /// cell limit.
    #[error("invalid grid dimensions {width}x{height}: must be positive and within the cell limit")]
    InvalidDimensions {
        /// Requested width.
        width: i64,
        /// Requested height.
        height: i64,
    },

    /// A coordinate lies outside the current grid extent.
    #[error("cell coordinates ({x}, {y}) out of bounds for grid {width}x{height}")]
    OutOfBounds {
        /// Requested column.
        x: i64,
        /// Requested row.
        y: i64,
        /// Current grid width.
        width: usize,
        /// Current grid height.
        height: usize,
    },

    /// A color state outside `{0, 1, 2}` was supplied.
    #[error("color state must be 0, 1, or 2, got {0}")]
    InvalidState(i64),

    /// A grid record does not describe a well-formed grid.
    #[error("malformed grid record: {reason}")]
    MalformedRecord {
        /// Explanation of what is wrong with the record.
        reason: String,
    },
}
