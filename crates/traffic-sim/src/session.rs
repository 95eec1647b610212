//! The operations a UI layer drives.
//!
//! [`Session`] owns the shared grid, the drag controller, the save file,
//! and at most one background continuous run. Every edit takes the grid's
//! write lock for its whole duration, so edits and ticks interleave only
//! at gesture and tick boundaries.

use std::path::Path;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use traffic_grid::{Grid, GridError, pattern};
use traffic_store::{GridFile, StoreError};

use crate::config::{SimulationConfig, TrafficConfig};
use crate::control::TickControl;
use crate::interaction::DragController;
use crate::runner::{self, NoOpCallback, RunResult, StepCallback};
use crate::state::{GridState, SharedGrid, StepSummary};

/// Errors returned by session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A grid operation was rejected.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// Saving or loading failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// No built-in pattern has the requested name.
    #[error("unknown pattern: {name}")]
    UnknownPattern {
        /// The requested name.
        name: String,
    },

    /// A continuous run was requested outside a Tokio runtime.
    #[error("no Tokio runtime available to drive the continuous run")]
    NoRuntime,

    /// The background tick task panicked or was cancelled.
    #[error("continuous run task failed: {message}")]
    TaskFailed {
        /// The join error message.
        message: String,
    },
}

/// A running background tick driver.
struct ContinuousRun {
    control: Arc<TickControl>,
    handle: JoinHandle<RunResult>,
}

/// One interactive grid session.
pub struct Session {
    grid: SharedGrid,
    drag: DragController,
    save_file: GridFile,
    simulation: SimulationConfig,
    continuous: Option<ContinuousRun>,
}

impl Session {
    /// Create a session over an empty `width` x `height` grid.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimensions`] if either dimension is not
    /// positive.
    pub fn new(width: i64, height: i64) -> Result<Self, SessionError> {
        Ok(Self::with_grid(Grid::new(width, height)?))
    }

    /// Create a session over an existing grid with default settings.
    pub fn with_grid(grid: Grid) -> Self {
        Self {
            grid: GridState::shared(grid),
            drag: DragController::new(),
            save_file: GridFile::default(),
            simulation: SimulationConfig::default(),
            continuous: None,
        }
    }

    /// Create a session sized and configured from `config`.
    ///
    /// The grid starts empty; loading and seeding are left to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimensions`] if the configured size is
    /// not positive.
    pub fn from_config(config: &TrafficConfig) -> Result<Self, SessionError> {
        let grid = Grid::new(i64::from(config.grid.width), i64::from(config.grid.height))?;
        Ok(Self {
            grid: GridState::shared(grid),
            drag: DragController::new(),
            save_file: GridFile::new(config.persistence.save_path.clone()),
            simulation: config.simulation.clone(),
            continuous: None,
        })
    }

    /// Handle to the shared grid, for readers such as a renderer.
    pub fn grid_handle(&self) -> SharedGrid {
        Arc::clone(&self.grid)
    }

    /// A copy of the current grid.
    pub async fn snapshot(&self) -> Grid {
        self.grid.read().await.grid().clone()
    }

    /// The configured save file.
    pub const fn save_file(&self) -> &GridFile {
        &self.save_file
    }

    /// The drag controller, for inspecting an in-progress gesture.
    pub const fn drag(&self) -> &DragController {
        &self.drag
    }

    /// Current `(width, height)`.
    pub async fn dimensions(&self) -> (usize, usize) {
        let state = self.grid.read().await;
        (state.grid().width(), state.grid().height())
    }

    // -----------------------------------------------------------------------
    // Editing
    // -----------------------------------------------------------------------

    /// Cycle the cell at `(x, y)` one state forward.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] if `(x, y)` is outside the grid.
    pub async fn click(&self, x: i64, y: i64) -> Result<(), SessionError> {
        self.grid.write().await.edit(|g| g.cycle_cell(x, y))?;
        debug!(x, y, "Cell clicked");
        Ok(())
    }

    /// Flip the cell at `(x, y)` between Empty and Barrier.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] if `(x, y)` is outside the grid.
    pub async fn toggle(&self, x: i64, y: i64) -> Result<(), SessionError> {
        self.grid.write().await.edit(|g| g.toggle_cell(x, y))?;
        Ok(())
    }

    /// Start a drag at `(x, y)`.
    pub async fn mouse_down(&mut self, x: i64, y: i64) {
        let state = self.grid.read().await;
        self.drag.mouse_down(x, y, state.grid());
    }

    /// Extend the current drag to `(x, y)`.
    pub async fn mouse_enter(&mut self, x: i64, y: i64) {
        let state = self.grid.read().await;
        self.drag.mouse_enter(x, y, state.grid());
    }

    /// Finish the current drag at `(x, y)`, cycling each visited cell once.
    ///
    /// Returns the number of cells cycled.
    pub async fn mouse_up(&mut self, x: i64, y: i64) -> usize {
        if !self.drag.is_dragging() {
            return 0;
        }
        let mut state = self.grid.write().await;
        state.edit(|g| self.drag.mouse_up(x, y, g))
    }

    /// Resize the grid, preserving cells inside the overlap.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimensions`] if either dimension is not
    /// positive; the grid is unchanged.
    pub async fn resize(&self, width: i64, height: i64) -> Result<(), SessionError> {
        self.grid.write().await.edit(|g| g.resize(width, height))?;
        info!(width, height, "Grid resized");
        Ok(())
    }

    /// Reset every cell to Empty and restart the generation count.
    pub async fn clear(&self) {
        let mut state = self.grid.write().await;
        state.edit(Grid::clear_all);
        state.reset_generation();
        info!("Grid cleared");
    }

    /// Stamp a built-in pattern with its origin at `(offset_x, offset_y)`
    /// and restart the generation count. Returns the number of cells placed.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownPattern`] if no pattern has that name.
    pub async fn stamp_pattern(
        &self,
        name: &str,
        offset_x: i64,
        offset_y: i64,
    ) -> Result<usize, SessionError> {
        let found = pattern::find(name).ok_or_else(|| SessionError::UnknownPattern {
            name: name.to_owned(),
        })?;
        let mut state = self.grid.write().await;
        let placed = state.edit(|g| found.stamp(g, offset_x, offset_y));
        state.reset_generation();
        info!(pattern = found.name, offset_x, offset_y, placed, "Pattern stamped");
        Ok(placed)
    }

    /// Number of non-Empty cells.
    pub async fn count_active(&self) -> usize {
        self.grid.read().await.grid().count_active()
    }

    /// Number of Barrier cells.
    pub async fn count_barrier(&self) -> usize {
        self.grid.read().await.grid().count_barrier()
    }

    /// Number of Active cells.
    pub async fn count_traffic(&self) -> usize {
        self.grid.read().await.grid().count_traffic()
    }

    /// Generations advanced since the last clear, load, or stamp.
    pub async fn generation(&self) -> u64 {
        self.grid.read().await.generation()
    }

    /// Advance one generation.
    pub async fn step(&self) -> StepSummary {
        let summary = self.grid.write().await.step();
        debug!(generation = summary.generation, traffic = summary.traffic, "Stepped");
        summary
    }

    // -----------------------------------------------------------------------
    // Continuous simulation
    // -----------------------------------------------------------------------

    /// Start the background tick driver. Returns `Ok(false)` if one is
    /// already running.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoRuntime`] when called outside a Tokio
    /// runtime.
    pub fn start_continuous(&mut self) -> Result<bool, SessionError> {
        self.start_continuous_with(Box::new(NoOpCallback))
    }

    /// Start the background tick driver with a per-tick callback. Returns
    /// `Ok(false)`, dropping the callback, if one is already running.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoRuntime`] when called outside a Tokio
    /// runtime.
    pub fn start_continuous_with(
        &mut self,
        mut callback: Box<dyn StepCallback>,
    ) -> Result<bool, SessionError> {
        if self.is_running() {
            return Ok(false);
        }
        let runtime = Handle::try_current().map_err(|e| {
            warn!(error = %e, "Continuous run requested without a runtime");
            SessionError::NoRuntime
        })?;
        let control = Arc::new(TickControl::from_config(&self.simulation));
        let grid = Arc::clone(&self.grid);
        let task_control = Arc::clone(&control);
        let handle = runtime.spawn(async move {
            runner::run_continuous(grid, task_control, callback.as_mut()).await
        });
        self.continuous = Some(ContinuousRun { control, handle });
        Ok(true)
    }

    /// Stop the background tick driver and wait for it to exit.
    ///
    /// Returns the run's result, or `None` if nothing was started. A run
    /// that already ended on its own is reaped here too.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::TaskFailed`] if the driver task panicked.
    pub async fn stop_continuous(&mut self) -> Result<Option<RunResult>, SessionError> {
        let Some(run) = self.continuous.take() else {
            return Ok(None);
        };
        run.control.request_stop();
        match run.handle.await {
            Ok(result) => Ok(Some(result)),
            Err(e) => {
                warn!(error = %e, "Continuous run task failed");
                Err(SessionError::TaskFailed {
                    message: e.to_string(),
                })
            }
        }
    }

    /// Start when idle, stop when running. Returns whether a run is
    /// active afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::TaskFailed`] if stopping found the driver
    /// task panicked, or [`SessionError::NoRuntime`] if starting found no
    /// runtime.
    pub async fn toggle_continuous(&mut self) -> Result<bool, SessionError> {
        if self.is_running() {
            self.stop_continuous().await?;
            Ok(false)
        } else {
            // Reap a run that ended by itself before starting another.
            self.stop_continuous().await?;
            self.start_continuous()
        }
    }

    /// Whether a background tick driver is currently running.
    pub fn is_running(&self) -> bool {
        self.continuous
            .as_ref()
            .is_some_and(|run| !run.control.is_finished() && !run.handle.is_finished())
    }

    /// Control of the current run, e.g. to change its tick interval.
    pub fn control(&self) -> Option<Arc<TickControl>> {
        self.continuous.as_ref().map(|run| Arc::clone(&run.control))
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Save the grid to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be written.
    pub async fn save(&self, path: &Path) -> Result<(), SessionError> {
        self.save_to(&GridFile::new(path)).await
    }

    /// Save the grid to the configured save file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be written.
    pub async fn save_default(&self) -> Result<(), SessionError> {
        self.save_to(&self.save_file).await
    }

    async fn save_to(&self, file: &GridFile) -> Result<(), SessionError> {
        let grid = self.snapshot().await;
        file.save(&grid)?;
        Ok(())
    }

    /// Replace the grid with the one stored at `path` and restart the
    /// generation count. On error the grid is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the file does not exist, or
    /// [`StoreError::Corrupt`] if it is malformed.
    pub async fn load(&self, path: &Path) -> Result<(), SessionError> {
        self.load_from(&GridFile::new(path)).await
    }

    /// Replace the grid with the configured save file's contents.
    ///
    /// # Errors
    ///
    /// Same as [`Session::load`].
    pub async fn load_default(&self) -> Result<(), SessionError> {
        self.load_from(&self.save_file).await
    }

    async fn load_from(&self, file: &GridFile) -> Result<(), SessionError> {
        let grid = file.load()?;
        self.grid.write().await.replace(grid);
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(run) = &self.continuous {
            run.control.request_stop();
        }
    }
}
