//! Saving and loading a grid to a single JSON file.

use std::fs::{self, File};
use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use traffic_grid::{Grid, GridRecord};

use crate::error::StoreError;

/// Default file name used when no save path is configured.
pub const DEFAULT_SAVE_PATH: &str = "saved_grid.json";

/// Encode a grid as a JSON string.
///
/// # Errors
///
/// Returns [`StoreError::Encode`] if serialization fails.
pub fn encode(grid: &Grid) -> Result<String, StoreError> {
    serde_json::to_string(&grid.to_record()).map_err(|source| StoreError::Encode { source })
}

/// Decode a grid from a JSON string.
///
/// # Errors
///
/// Returns [`StoreError::Corrupt`] if the text is not valid JSON, does not
/// match the record shape, or describes an invalid grid.
pub fn decode(json: &str) -> Result<Grid, StoreError> {
    let record: GridRecord = serde_json::from_str(json).map_err(|e| StoreError::Corrupt {
        reason: e.to_string(),
    })?;
    record_to_grid(&record)
}

fn record_to_grid(record: &GridRecord) -> Result<Grid, StoreError> {
    Grid::from_record(record).map_err(|e| StoreError::Corrupt {
        reason: e.to_string(),
    })
}

/// A grid save file at a fixed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridFile {
    path: PathBuf,
}

impl Default for GridFile {
    fn default() -> Self {
        Self::new(DEFAULT_SAVE_PATH)
    }
}

impl GridFile {
    /// Create a handle for the file at `path`. Nothing is touched on disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The target path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the target file currently exists.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Write `grid` to the file, replacing any previous contents.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file cannot be written, or
    /// [`StoreError::Encode`] if serialization fails.
    pub fn save(&self, grid: &Grid) -> Result<(), StoreError> {
        let json = encode(grid)?;
        let temp = self.temp_path();
        let result = write_text(&temp, &json)
            .and_then(|()| fs::rename(&temp, &self.path).map_err(|e| self.io_error(e)));

        if result.is_err() {
            // Remove the partial temp file; the write error is returned.
            let _ = fs::remove_file(&temp);
        }
        result?;

        info!(
            path = %self.path.display(),
            width = grid.width(),
            height = grid.height(),
            active = grid.count_active(),
            "Grid saved"
        );
        Ok(())
    }

    /// Read the grid stored in the file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the file does not exist,
    /// [`StoreError::Corrupt`] if its contents are malformed, or
    /// [`StoreError::Io`] for any other read failure.
    pub fn load(&self) -> Result<Grid, StoreError> {
        let text = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound {
                path: self.path.clone(),
            },
            ErrorKind::InvalidData => StoreError::Corrupt {
                reason: format!("not UTF-8 text: {e}"),
            },
            _ => self.io_error(e),
        })?;
        debug!(path = %self.path.display(), bytes = text.len(), "Grid file read");

        let grid = decode(&text)?;
        info!(
            path = %self.path.display(),
            width = grid.width(),
            height = grid.height(),
            "Grid loaded"
        );
        Ok(grid)
    }
}

fn write_text(path: &Path, text: &str) -> Result<(), StoreError> {
    let io_error = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::create(path).map_err(io_error)?;
    file.write_all(text.as_bytes()).map_err(io_error)?;
    file.sync_all().map_err(io_error)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use traffic_grid::ColorState;

    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("traffic-store-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn encode_decode_round_trip() {
        let mut grid = Grid::new(3, 2).unwrap();
        grid.set_color(0, 0, ColorState::Barrier).unwrap();
        grid.set_color(2, 1, ColorState::Active).unwrap();
        let json = encode(&grid).unwrap();
        assert_eq!(decode(&json).unwrap(), grid);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(decode("not json"), Err(StoreError::Corrupt { .. })));
        assert!(matches!(
            decode(r#"{"width": 2, "height": 1}"#),
            Err(StoreError::Corrupt { .. })
        ));
        assert!(matches!(
            decode(r#"{"width": -2, "height": 1, "cells": [[]]}"#),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn save_then_load() {
        let path = scratch("save-then-load");
        let file = GridFile::new(&path);
        let mut grid = Grid::new(5, 4).unwrap();
        grid.set_color(4, 3, ColorState::Active).unwrap();

        file.save(&grid).unwrap();
        assert!(file.exists());
        assert!(!file.temp_path().exists());
        assert_eq!(file.load().unwrap(), grid);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let file = GridFile::new(scratch("definitely-missing"));
        let err = file.load().unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn load_truncated_file_is_corrupt() {
        let path = scratch("truncated");
        fs::write(&path, r#"{"width": 2, "height": 1, "cells": [[true,"#).unwrap();
        let err = GridFile::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn oversized_dimensions_are_corrupt_not_fatal() {
        let huge = r#"{"width": 1152921504606846976, "height": 1, "cells": [[]]}"#;
        assert!(matches!(decode(huge), Err(StoreError::Corrupt { .. })));

        let path = scratch("oversized");
        fs::write(&path, r#"{"width": 100000, "height": 100000, "cells": [[]]}"#).unwrap();
        let err = GridFile::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn non_utf8_file_is_corrupt() {
        let path = scratch("binary");
        fs::write(&path, [0xff_u8, 0xfe, 0x00]).unwrap();
        let err = GridFile::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn default_path() {
        assert_eq!(GridFile::default().path(), Path::new(DEFAULT_SAVE_PATH));
    }
}
