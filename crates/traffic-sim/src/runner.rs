//! Continuous simulation loop.
//!
//! [`run_continuous`] advances the shared grid once per tick, sleeping the
//! configured interval between ticks, until one of:
//!
//! - **Stop**: [`TickControl::request_stop`] was called
//! - **Tick limit**: `max_ticks` generations ran
//! - **Time limit**: `max_real_time_seconds` elapsed
//! - **Repeat**: with `stop_on_cycle`, a generation matched a recent one
//!
//! Each step holds the grid's write lock for its whole duration, so user
//! edits interleave only between ticks.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::control::{RunEndReason, TickControl};
use crate::cycle::CycleDetector;
use crate::state::{SharedGrid, StepSummary};

/// Result of a continuous run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunResult {
    /// Why the run ended.
    pub end_reason: RunEndReason,
    /// Number of generations advanced by this run.
    pub total_ticks: u64,
    /// Summary of the last generation, if any tick ran.
    pub final_summary: Option<StepSummary>,
}

/// Callback invoked after each tick of a continuous run.
///
/// Implementations can use this to redraw a view, update counters, etc.
/// The grid lock is already released when the callback runs.
pub trait StepCallback: Send {
    /// Called after a generation completes.
    fn on_step(&mut self, summary: &StepSummary);
}

impl<F> StepCallback for F
where
    F: FnMut(&StepSummary) + Send,
{
    fn on_step(&mut self, summary: &StepSummary) {
        self(summary);
    }
}

/// A no-op step callback.
pub struct NoOpCallback;

impl StepCallback for NoOpCallback {
    fn on_step(&mut self, _summary: &StepSummary) {}
}

/// Run generations until a termination condition is met.
///
/// Stop requests are honored before the next tick, never mid-step. A stop
/// arriving while the loop sleeps wakes it immediately.
pub async fn run_continuous(
    grid: SharedGrid,
    control: Arc<TickControl>,
    callback: &mut dyn StepCallback,
) -> RunResult {
    let mut detector = CycleDetector::new(control.cycle_history());
    let mut observed_epoch: Option<u64> = None;
    let mut total_ticks: u64 = 0;
    let mut last_summary: Option<StepSummary> = None;

    info!(
        tick_interval_ms = control.tick_interval_ms(),
        max_ticks = control.max_ticks(),
        max_real_time_seconds = control.max_real_time_seconds(),
        stop_on_cycle = control.stop_on_cycle(),
        "Continuous simulation starting"
    );

    let end_reason = loop {
        // --- Check stop request (before tick) ---
        if control.is_stop_requested() {
            break RunEndReason::Stopped;
        }

        // --- Check time limit (before tick) ---
        if control.time_limit_reached() {
            break RunEndReason::MaxRealTimeReached;
        }

        // --- Execute tick ---
        let (summary, repeated) = {
            let mut state = grid.write().await;
            if control.stop_on_cycle() && observed_epoch != Some(state.edit_epoch()) {
                // The grid was edited by hand; earlier generations no longer apply.
                detector.reset();
                detector.observe(state.grid());
                observed_epoch = Some(state.edit_epoch());
            }
            let summary = state.step();
            let repeated = control.stop_on_cycle() && detector.observe(state.grid());
            (summary, repeated)
        };

        total_ticks = total_ticks.saturating_add(1);
        debug!(
            generation = summary.generation,
            traffic = summary.traffic,
            changed = summary.changed,
            "Tick complete"
        );

        // --- Notify callback ---
        callback.on_step(&summary);
        last_summary = Some(summary);

        if repeated {
            warn!(generation = summary.generation, "Generation repeated -- stopping");
            break RunEndReason::CycleDetected;
        }

        // --- Check tick limit (after tick) ---
        if control.tick_limit_reached(total_ticks) {
            break RunEndReason::MaxTicksReached;
        }

        // --- Sleep for tick interval ---
        let interval_ms = control.tick_interval_ms();
        if interval_ms > 0 {
            tokio::select! {
                () = tokio::time::sleep(Duration::from_millis(interval_ms)) => {}
                () = control.stop_requested() => {}
            }
        } else {
            tokio::task::yield_now().await;
        }
    };

    control.mark_finished(end_reason).await;
    let result = RunResult {
        end_reason,
        total_ticks,
        final_summary: last_summary,
    };
    log_run_end(&result);
    result
}

/// Log how a run ended.
pub fn log_run_end(result: &RunResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_generation = result.final_summary.map(|s| s.generation),
        final_traffic = result.final_summary.map(|s| s.traffic),
        "Continuous simulation ended"
    );
}
