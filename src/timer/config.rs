//! File form of the timer options
//!
//! Callbacks cannot live in a file, so this only carries the tick interval and
//! an optional default countdown length used when `start` is called bare.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use super::options::{DEFAULT_TICK_SECS, TimerOptions};

fn default_tick_secs() -> f64 {
    DEFAULT_TICK_SECS
}

/// Timer settings loaded from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Seconds between tick callbacks
    #[serde(default = "default_tick_secs")]
    pub tick_secs: f64,

    /// Countdown length used by drivers when no duration is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_duration_secs: Option<f64>,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_secs: DEFAULT_TICK_SECS,
            default_duration_secs: None,
        }
    }
}

impl TimerConfig {
    /// Load from a TOML file; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse(_, source) => ConfigError::Parse(path.to_path_buf(), source),
            other => other,
        })
    }

    /// Parse TOML text and validate it
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::Parse(Default::default(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a TOML file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::Io(path.to_path_buf(), e))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tick_secs.is_finite() || self.tick_secs <= 0.0 {
            return Err(ConfigError::Invalid {
                reason: format!("tick_secs must be positive, got {}", self.tick_secs),
            });
        }
        if let Some(secs) = self.default_duration_secs {
            if !secs.is_finite() || secs <= 0.0 {
                return Err(ConfigError::Invalid {
                    reason: format!("default_duration_secs must be positive, got {secs}"),
                });
            }
        }
        Ok(())
    }

    /// Option bag carrying this config's tick interval
    pub fn to_options(&self) -> TimerOptions {
        TimerOptions::new().tick(self.tick_secs)
    }
}
