//! Engine configuration.
//!
//! ```toml
//! default_grid_size = 4
//! timed_matches = true
//! turn_duration_ms = 5000
//! ```
//!
//! Every field is optional.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, instrument};

use super::board::GridSize;
use super::timer::DEFAULT_TURN_DURATION_MS;

/// Tunables for an [`AppState`](super::AppState).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Grid size used when the caller does not pick one
    pub default_grid_size: GridSize,

    /// Attach a turn timer to every new match
    pub timed_matches: bool,

    /// Turn length for timed matches
    pub turn_duration_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_grid_size: GridSize::Three,
            timed_matches: false,
            turn_duration_ms: DEFAULT_TURN_DURATION_MS,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl EngineConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&content)?;
        info!(
            grid_size = config.default_grid_size.value(),
            timed = config.timed_matches,
            "Config loaded"
        );
        Ok(config)
    }

    /// Turn length to apply to new matches, if timed.
    pub fn turn_timer_ms(&self) -> Option<u64> {
        self.timed_matches.then_some(self.turn_duration_ms)
    }
}
