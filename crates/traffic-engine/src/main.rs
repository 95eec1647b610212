//! Headless engine binary for the Conway traffic simulation.
//!
//! Loads configuration, restores or seeds a grid, and runs the continuous
//! simulation until Ctrl-C or a configured run bound ends it.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `traffic-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Create the session from the configured grid size
//! 4. Restore the saved grid, or stamp the seed pattern on a fresh one
//! 5. Run the continuous simulation until stopped
//! 6. Save the grid if configured

mod error;
mod progress;

use std::path::Path;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use traffic_sim::config::CONFIG_FILE;
use traffic_sim::{Session, SessionError, TrafficConfig};

use crate::error::EngineError;
use crate::progress::ProgressCallback;

/// Generations between progress log lines.
const PROGRESS_EVERY: u64 = 50;

/// Application entry point for the traffic engine.
///
/// # Errors
///
/// Returns an error if configuration, restoring, seeding, or saving fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging is not up yet, so report later.
    let (config, config_found) = load_config()?;

    // 2. Initialize structured logging. RUST_LOG wins over the config.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&config.logging.level))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("traffic-engine starting");
    if !config_found {
        info!(path = CONFIG_FILE, "Config file not found, using defaults");
    }
    info!(
        width = config.grid.width,
        height = config.grid.height,
        tick_interval_ms = config.simulation.tick_interval_ms,
        max_ticks = config.simulation.max_ticks,
        save_path = %config.persistence.save_path.display(),
        "Configuration loaded"
    );

    // 3. Create the session.
    let mut session = Session::from_config(&config).map_err(EngineError::from)?;

    // 4. Restore or seed.
    restore_or_seed(&session, &config).await?;
    info!(
        active = session.count_active().await,
        traffic = session.count_traffic().await,
        "Grid ready, entering tick loop"
    );

    // 5. Run until Ctrl-C or a run bound.
    session
        .start_continuous_with(Box::new(ProgressCallback::new(PROGRESS_EVERY)))
        .map_err(EngineError::from)?;
    if let Some(control) = session.control() {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => info!("Interrupt received, stopping"),
                Err(e) => warn!(error = %e, "Failed to listen for interrupt, stopping"),
            },
            () = control.finished() => {}
        }
    }
    let result = session.stop_continuous().await.map_err(EngineError::from)?;

    // 6. Save on exit.
    if config.persistence.save_on_exit {
        session.save_default().await.map_err(EngineError::from)?;
    }

    info!(
        end_reason = ?result.map(|r| r.end_reason),
        generation = session.generation().await,
        "traffic-engine shutdown complete"
    );
    Ok(())
}

/// Load configuration from `traffic-config.yaml` in the working directory.
///
/// Returns the config and whether the file was found.
fn load_config() -> Result<(TrafficConfig, bool), EngineError> {
    let config_path = Path::new(CONFIG_FILE);
    if config_path.exists() {
        Ok((TrafficConfig::from_file(config_path)?, true))
    } else {
        let mut config = TrafficConfig::default();
        config.apply_env_overrides();
        Ok((config, false))
    }
}

/// Load the saved grid when configured and present; otherwise stamp the
/// configured seed pattern onto the fresh grid.
///
/// A missing or unreadable save file is not fatal.
async fn restore_or_seed(session: &Session, config: &TrafficConfig) -> Result<(), EngineError> {
    if config.persistence.load_on_start {
        match session.load_default().await {
            Ok(()) => {
                let (width, height) = session.dimensions().await;
                info!(
                    path = %session.save_file().path().display(),
                    width,
                    height,
                    "Saved grid restored"
                );
                return Ok(());
            }
            Err(SessionError::Store(e)) if e.is_not_found() => {
                info!("No saved grid, starting fresh");
            }
            Err(SessionError::Store(e)) => {
                warn!(error = %e, "Saved grid unreadable, starting fresh");
            }
            Err(e) => return Err(e.into()),
        }
    }

    if let Some(name) = &config.seed.pattern {
        session
            .stamp_pattern(name, config.seed.offset_x, config.seed.offset_y)
            .await?;
    }
    Ok(())
}
