//! Control state for one continuous run.
//!
//! A [`TickControl`] is shared between the tick driver task and whoever
//! started it. The driver checks it before every tick; stop requests wake a
//! sleeping driver immediately but never interrupt a step in progress.
//!
//! Mutable control fields are atomics so the driver can read them without
//! taking a lock on every tick.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, Notify};

use crate::config::SimulationConfig;
use crate::cycle::DEFAULT_CYCLE_HISTORY;

/// Smallest accepted runtime tick interval.
pub const MIN_TICK_INTERVAL_MS: u64 = 10;

/// Why a continuous run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEndReason {
    /// Stop was requested.
    Stopped,
    /// The configured tick limit was reached.
    MaxTicksReached,
    /// The configured wall-clock limit was reached.
    MaxRealTimeReached,
    /// A generation repeated one of the recent ones.
    CycleDetected,
}

/// Shared control state for a continuous run.
#[derive(Debug)]
pub struct TickControl {
    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Wakes a driver sleeping between ticks.
    stop_notify: Notify,

    /// Current delay between ticks in milliseconds.
    tick_interval_ms: AtomicU64,

    /// Wall-clock time when the control was created.
    started_at: DateTime<Utc>,

    /// Maximum ticks for this run (0 = unlimited).
    max_ticks: u64,

    /// Maximum wall-clock seconds for this run (0 = unlimited).
    max_real_time_seconds: u64,

    /// Stop when a generation repeats.
    stop_on_cycle: bool,

    /// Number of recent generations compared for repeats.
    cycle_history: usize,

    /// Set once the driver has exited.
    finished: AtomicBool,

    /// Wakes tasks waiting for the driver to exit.
    finished_notify: Notify,

    /// Reason the run ended, if it has.
    end_reason: Mutex<Option<RunEndReason>>,
}

impl Default for TickControl {
    fn default() -> Self {
        Self::new(0)
    }
}

impl TickControl {
    /// Create an unbounded control with the given tick interval.
    pub fn new(tick_interval_ms: u64) -> Self {
        Self {
            stop_requested: AtomicBool::new(false),
            stop_notify: Notify::new(),
            tick_interval_ms: AtomicU64::new(tick_interval_ms),
            started_at: Utc::now(),
            max_ticks: 0,
            max_real_time_seconds: 0,
            stop_on_cycle: false,
            cycle_history: DEFAULT_CYCLE_HISTORY,
            finished: AtomicBool::new(false),
            finished_notify: Notify::new(),
            end_reason: Mutex::new(None),
        }
    }

    /// Create a control from simulation configuration.
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            max_ticks: config.max_ticks,
            max_real_time_seconds: config.max_real_time_seconds,
            stop_on_cycle: config.stop_on_cycle,
            cycle_history: config.cycle_history,
            ..Self::new(config.tick_interval_ms)
        }
    }

    /// Builder: stop after `max_ticks` ticks (0 = unlimited).
    #[must_use]
    pub const fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    /// Builder: stop when a generation repeats within `history` generations.
    #[must_use]
    pub const fn with_cycle_stop(mut self, history: usize) -> Self {
        self.stop_on_cycle = true;
        self.cycle_history = history;
        self
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Request a clean stop. Takes effect before the next tick.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.stop_notify.notify_waiters();
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Wait until a stop is requested.
    pub async fn stop_requested(&self) {
        loop {
            let notified = self.stop_notify.notified();
            if self.is_stop_requested() {
                return;
            }
            notified.await;
        }
    }

    // -----------------------------------------------------------------------
    // Completion
    // -----------------------------------------------------------------------

    /// Record that the driver exited and why.
    pub async fn mark_finished(&self, reason: RunEndReason) {
        *self.end_reason.lock().await = Some(reason);
        self.finished.store(true, Ordering::Release);
        self.finished_notify.notify_waiters();
    }

    /// Whether the driver has exited.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Wait until the driver has exited.
    pub async fn finished(&self) {
        loop {
            let notified = self.finished_notify.notified();
            if self.is_finished() {
                return;
            }
            notified.await;
        }
    }

    /// Get the reason the run ended, if it has.
    pub async fn end_reason(&self) -> Option<RunEndReason> {
        *self.end_reason.lock().await
    }

    // -----------------------------------------------------------------------
    // Tick Speed
    // -----------------------------------------------------------------------

    /// Get the current tick interval in milliseconds.
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms.load(Ordering::Acquire)
    }

    /// Set the tick interval in milliseconds.
    ///
    /// Returns the previous interval, or `None` if `ms` is below
    /// [`MIN_TICK_INTERVAL_MS`] and was rejected.
    pub fn set_tick_interval_ms(&self, ms: u64) -> Option<u64> {
        if ms < MIN_TICK_INTERVAL_MS {
            return None;
        }
        Some(self.tick_interval_ms.swap(ms, Ordering::AcqRel))
    }

    // -----------------------------------------------------------------------
    // Boundaries
    // -----------------------------------------------------------------------

    /// Returns `true` if `max_ticks > 0` and `ticks_run >= max_ticks`.
    pub const fn tick_limit_reached(&self, ticks_run: u64) -> bool {
        self.max_ticks > 0 && ticks_run >= self.max_ticks
    }

    /// Returns `true` if a wall-clock limit is set and has elapsed.
    pub fn time_limit_reached(&self) -> bool {
        self.max_real_time_seconds > 0 && self.elapsed_seconds() >= self.max_real_time_seconds
    }

    /// Return elapsed seconds since the control was created.
    pub fn elapsed_seconds(&self) -> u64 {
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        // `num_seconds` can be negative if clocks are weird; treat as 0.
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }

    /// Return the wall-clock start time.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Get the configured max ticks.
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Get the configured max real-time seconds.
    pub const fn max_real_time_seconds(&self) -> u64 {
        self.max_real_time_seconds
    }

    /// Whether repeats end the run.
    pub const fn stop_on_cycle(&self) -> bool {
        self.stop_on_cycle
    }

    /// Number of recent generations compared for repeats.
    pub const fn cycle_history(&self) -> usize {
        self.cycle_history
    }
}
