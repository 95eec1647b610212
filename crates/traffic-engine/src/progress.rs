//! Step callback that reports progress through the log.

use traffic_sim::{StepCallback, StepSummary};
use tracing::info;

/// Logs a summary line every `every` generations, and whenever the grid
/// stops changing.
pub struct ProgressCallback {
    every: u64,
    settled: bool,
}

impl ProgressCallback {
    /// Create a callback that reports every `every` generations (minimum 1).
    pub fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
            settled: false,
        }
    }
}

impl StepCallback for ProgressCallback {
    fn on_step(&mut self, summary: &StepSummary) {
        if !summary.changed && !self.settled {
            info!(
                generation = summary.generation,
                traffic = summary.traffic,
                barrier = summary.barrier,
                "Grid settled"
            );
        }
        self.settled = !summary.changed;

        if summary.generation.checked_rem(self.every) == Some(0) {
            info!(
                generation = summary.generation,
                active = summary.active,
                barrier = summary.barrier,
                traffic = summary.traffic,
                "Simulation progress"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(generation: u64, changed: bool) -> StepSummary {
        StepSummary {
            generation,
            active: 0,
            barrier: 0,
            traffic: 0,
            changed,
        }
    }

    #[test]
    fn zero_interval_is_clamped() {
        let mut callback = ProgressCallback::new(0);
        callback.on_step(&summary(1, true));
        assert_eq!(callback.every, 1);
    }

    #[test]
    fn tracks_settled_state() {
        let mut callback = ProgressCallback::new(10);
        callback.on_step(&summary(1, false));
        assert!(callback.settled);
        callback.on_step(&summary(2, true));
        assert!(!callback.settled);
    }
}
