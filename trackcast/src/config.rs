//! Extrapolation settings.
//!
//! Settings live in the `[extrapolation]` section of an INI file:
//!
//! ```ini
//! [extrapolation]
//! enabled = true
//! refresh_rate = 1.0
//! strategy = stateful
//! evict_stale = true
//! track_trail_length = 9
//! ```
//!
//! Missing keys keep their defaults and unknown keys are ignored.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use tracing::{debug, warn};

use crate::error::{ConfigError, ExtrapolationError};
use crate::extrapolation::{ExtrapolationStrategy, Lookahead};
use crate::model::DEFAULT_TRAIL_LENGTH;

/// INI section holding the extrapolation settings.
pub const CONFIG_SECTION: &str = "extrapolation";

/// Default expected interval between server updates.
pub const DEFAULT_REFRESH_RATE: Duration = Duration::from_secs(1);

/// Settings for one extrapolation engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtrapolationConfig {
    /// Whether ticks extrapolate at all. When off, ticks pass data through.
    pub enabled: bool,

    /// Expected interval between server updates. Must be non-zero.
    pub refresh_rate: Duration,

    /// Forecasting strategy.
    pub strategy: ExtrapolationStrategy,

    /// Drop forecaster memory for entities that vanished from a tick.
    pub evict_stale: bool,

    /// Real reports to keep per track. Ingestion applies it through
    /// [`crate::model::Track::record`]; the CLI replay trims scenario tracks to it.
    pub track_trail_length: usize,
}

impl Default for ExtrapolationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            refresh_rate: DEFAULT_REFRESH_RATE,
            strategy: ExtrapolationStrategy::default(),
            evict_stale: true,
            track_trail_length: DEFAULT_TRAIL_LENGTH,
        }
    }
}

impl ExtrapolationConfig {
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_refresh_rate(mut self, refresh_rate: Duration) -> Self {
        self.refresh_rate = refresh_rate;
        self
    }

    pub fn with_strategy(mut self, strategy: ExtrapolationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_evict_stale(mut self, evict_stale: bool) -> Self {
        self.evict_stale = evict_stale;
        self
    }

    pub fn with_track_trail_length(mut self, length: usize) -> Self {
        self.track_trail_length = length;
        self
    }

    /// Lookahead window for the configured refresh rate.
    pub fn lookahead(&self) -> Result<Lookahead, ExtrapolationError> {
        Lookahead::from_refresh_rate(self.refresh_rate.as_secs_f64())
    }

    /// Check the settings an engine cannot run without.
    pub fn validate(&self) -> Result<(), ExtrapolationError> {
        self.lookahead().map(|_| ())
    }

    /// Load from the default config file, falling back to defaults if it is absent.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_file_path();
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load from a specific INI file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_ini_str(&content)?;
        debug!(path = %path.display(), ?config, "Loaded config");
        Ok(config)
    }

    /// Parse INI text.
    pub fn from_ini_str(content: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let mut config = Self::default();

        let Some(section) = ini.section(Some(CONFIG_SECTION)) else {
            return Ok(config);
        };

        for (key, value) in section.iter() {
            match key {
                "enabled" => config.enabled = parse_bool(key, value)?,
                "refresh_rate" => config.refresh_rate = parse_seconds(key, value)?,
                "strategy" => {
                    config.strategy = value
                        .parse()
                        .map_err(|_| invalid_value(key, value))?
                }
                "evict_stale" => config.evict_stale = parse_bool(key, value)?,
                "track_trail_length" => {
                    config.track_trail_length =
                        value.trim().parse().map_err(|_| invalid_value(key, value))?
                }
                other => warn!(key = other, "Ignoring unknown config key"),
            }
        }

        Ok(config)
    }

    /// Render as INI text (the same format [`from_ini_str`](Self::from_ini_str) reads).
    pub fn to_ini_string(&self) -> String {
        format!(
            "[{}]\nenabled = {}\nrefresh_rate = {}\nstrategy = {}\nevict_stale = {}\ntrack_trail_length = {}\n",
            CONFIG_SECTION,
            self.enabled,
            self.refresh_rate.as_secs_f64(),
            self.strategy,
            self.evict_stale,
            self.track_trail_length
        )
    }
}

/// Default location of the config file.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("trackcast")
        .join("config.ini")
}

fn invalid_value(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: format!("{}.{}", CONFIG_SECTION, key),
        value: value.to_string(),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid_value(key, value)),
    }
}

fn parse_seconds(key: &str, value: &str) -> Result<Duration, ConfigError> {
    let secs: f64 = value.trim().parse().map_err(|_| invalid_value(key, value))?;
    Duration::try_from_secs_f64(secs).map_err(|_| invalid_value(key, value))
}
