//! Configuration for the raffle
//!
//! Defines slot count, win probability, the event window and store behaviour.

use raffle_domain::Timestamp;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration loading error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration for one raffle event
///
/// # Examples
///
/// ```
/// use raffle_ledger::LotteryConfig;
///
/// let config = LotteryConfig::default();
/// assert_eq!(config.slot_count, 1);
/// assert_eq!(config.win_probability, 0.3);
/// assert_eq!(config.duration_days, 90);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LotteryConfig {
    /// Key the event's record is stored under
    /// Default: "lottery_data"
    pub event_key: String,

    /// Number of reward slots
    /// Default: 1
    pub slot_count: u32,

    /// Chance that a first-time claim wins while a slot is free
    /// Default: 0.3
    pub win_probability: f64,

    /// Length of the event window in days, used when `deadline_ms` is unset
    /// Default: 90
    pub duration_days: u64,

    /// Absolute deadline (ms since the Unix epoch); overrides `duration_days`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline_ms: Option<u64>,

    /// Attempts at the read-decide-write sequence before reporting a persistence failure
    /// Default: 3
    pub max_save_attempts: u32,

    /// How long a store write may wait on a locked database (milliseconds)
    /// Default: 2000
    pub store_timeout_ms: u64,

    /// SQLite database file
    /// Default: "raffle.db"
    pub database: PathBuf,
}

/// On-disk layout: settings live under a `[lottery]` table
#[derive(Debug, Default, Deserialize, Serialize)]
struct ConfigFile {
    #[serde(default)]
    lottery: LotteryConfig,
}

impl Default for LotteryConfig {
    fn default() -> Self {
        Self {
            event_key: "lottery_data".to_string(),
            slot_count: 1,
            win_probability: 0.3,
            duration_days: 90,
            deadline_ms: None,
            max_save_attempts: 3,
            store_timeout_ms: 2_000,
            database: PathBuf::from("raffle.db"),
        }
    }
}

impl LotteryConfig {
    /// Every first-time claim wins while a slot is free
    ///
    /// Suitable for demos and smoke tests.
    pub fn generous() -> Self {
        Self {
            win_probability: 1.0,
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML text and validate it
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(contents)?;
        file.lottery.validate()?;
        Ok(file.lottery)
    }

    /// Render as TOML, in the same layout `from_toml_str` reads
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        let file = ConfigFile { lottery: self.clone() };
        toml::to_string_pretty(&file).map_err(|e| ConfigError::Invalid(format!("Failed to serialize config: {}", e)))
    }

    /// Check every value is in range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.event_key.trim().is_empty() {
            return Err(ConfigError::Invalid("event_key cannot be empty".to_string()));
        }
        if self.slot_count == 0 {
            return Err(ConfigError::Invalid("slot_count must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.win_probability) {
            return Err(ConfigError::Invalid(format!(
                "win_probability {} is outside [0.0, 1.0]",
                self.win_probability
            )));
        }
        if self.max_save_attempts == 0 {
            return Err(ConfigError::Invalid("max_save_attempts must be at least 1".to_string()));
        }
        if self.deadline_ms.is_none() && self.duration_days == 0 {
            return Err(ConfigError::Invalid(
                "duration_days must be at least 1 when no deadline_ms is set".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the event window length as Duration
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_days.saturating_mul(86_400))
    }

    /// Deadline for an event opened at `opened_at`
    pub fn deadline_from(&self, opened_at: Timestamp) -> Timestamp {
        match self.deadline_ms {
            Some(ms) => Timestamp::from_millis(ms),
            None => opened_at.saturating_add(self.duration()),
        }
    }

    /// Get store timeout as Duration
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}
