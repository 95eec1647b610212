//! Evolution, interaction, and tick driving for the Conway traffic grid.
//!
//! This crate turns the static grid model into a live simulation: the
//! evolution rule, click-drag painting, a shared grid state with a
//! generation counter, and a cancellable background tick driver, all
//! fronted by [`Session`].
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `traffic-config.yaml` into
//!   strongly-typed structs.
//! - [`control`] -- [`TickControl`]: stop signal, tick interval, and run
//!   bounds shared with the driver task.
//! - [`cycle`] -- Repeat detection over recent generations.
//! - [`evolution`] -- The `advance` step rule.
//! - [`interaction`] -- [`DragController`] click-drag state machine.
//! - [`runner`] -- [`run_continuous`], the background tick loop.
//! - [`session`] -- [`Session`], the operations a UI layer drives.
//! - [`state`] -- [`SharedGrid`] and per-step summaries.
//!
//! [`TickControl`]: control::TickControl
//! [`DragController`]: interaction::DragController
//! [`run_continuous`]: runner::run_continuous
//! [`SharedGrid`]: state::SharedGrid

pub mod config;
pub mod control;
pub mod cycle;
pub mod evolution;
pub mod interaction;
pub mod runner;
pub mod session;
pub mod state;

pub use config::TrafficConfig;
pub use control::{RunEndReason, TickControl};
pub use evolution::advance;
pub use interaction::{DragController, DragState};
pub use runner::{NoOpCallback, RunResult, StepCallback};
pub use session::{Session, SessionError};
pub use state::{GridState, SharedGrid, StepSummary};
