//! Error types for grid persistence.
//!
//! All errors are propagated via [`StoreError`], which records which file
//! was involved and whether the data itself or the filesystem failed.

use std::path::PathBuf;

/// Errors that can occur while saving or loading a grid.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The file to load does not exist.
    #[error("no saved grid at {}", path.display())]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// The file exists but does not hold a well-formed grid record.
    #[error("corrupt grid data: {reason}")]
    Corrupt {
        /// What was wrong with the data.
        reason: String,
    },

    /// A filesystem operation failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The path being read or written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The grid record could not be encoded.
    #[error("failed to encode grid: {source}")]
    Encode {
        /// The underlying serialization error.
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Whether this error means "nothing saved yet" rather than a real failure.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
