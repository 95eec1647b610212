//! Configuration loading and typed config structures.
//!
//! The configuration lives in `traffic-config.yaml` in the working
//! directory. Every field has a default, so a missing file or a partial
//! file is fine.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cycle::DEFAULT_CYCLE_HISTORY;

/// Conventional config file name.
pub const CONFIG_FILE: &str = "traffic-config.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TrafficConfig {
    /// Initial grid size.
    #[serde(default)]
    pub grid: GridConfig,

    /// Continuous simulation settings.
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Save file settings.
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Optional seed pattern for a fresh grid.
    #[serde(default)]
    pub seed: SeedConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TrafficConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `TRAFFIC_SAVE_PATH` overrides `persistence.save_path`
    /// - `TRAFFIC_TICK_INTERVAL_MS` overrides `simulation.tick_interval_ms`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string. No environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("TRAFFIC_SAVE_PATH") {
            self.persistence.save_path = PathBuf::from(path);
        }
        if let Some(ms) = lookup("TRAFFIC_TICK_INTERVAL_MS").and_then(|v| v.trim().parse().ok()) {
            self.simulation.tick_interval_ms = ms;
        }
    }
}

/// Grid dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct GridConfig {
    /// Number of columns.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Number of rows.
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

/// Continuous simulation settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Delay between generations in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Stop after this many generations (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,

    /// Stop after this many wall-clock seconds (0 = unlimited).
    #[serde(default)]
    pub max_real_time_seconds: u64,

    /// Stop when a generation repeats one of the recent ones.
    #[serde(default)]
    pub stop_on_cycle: bool,

    /// Number of recent generations compared for repeats.
    #[serde(default = "default_cycle_history")]
    pub cycle_history: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            max_ticks: 0,
            max_real_time_seconds: 0,
            stop_on_cycle: false,
            cycle_history: default_cycle_history(),
        }
    }
}

/// Save file settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PersistenceConfig {
    /// Path of the grid save file.
    #[serde(default = "default_save_path")]
    pub save_path: PathBuf,

    /// Load the save file at startup when it exists.
    #[serde(default = "default_true")]
    pub load_on_start: bool,

    /// Save the grid when the engine exits.
    #[serde(default = "default_true")]
    pub save_on_exit: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            save_path: default_save_path(),
            load_on_start: true,
            save_on_exit: true,
        }
    }
}

/// Seed pattern stamped onto a fresh grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SeedConfig {
    /// Built-in pattern name (`block`, `blinker`, `toad`, `beacon`, `glider`).
    #[serde(default)]
    pub pattern: Option<String>,

    /// Column of the pattern origin.
    #[serde(default)]
    pub offset_x: i64,

    /// Row of the pattern origin.
    #[serde(default)]
    pub offset_y: i64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

const fn default_width() -> u32 {
    42
}

const fn default_height() -> u32 {
    25
}

const fn default_tick_interval_ms() -> u64 {
    200
}

const fn default_cycle_history() -> usize {
    DEFAULT_CYCLE_HISTORY
}

fn default_save_path() -> PathBuf {
    PathBuf::from(traffic_store::DEFAULT_SAVE_PATH)
}

const fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_owned()
}
