//! Configuration management for the CLI.
//!
//! One TOML file carries both the event settings (`[lottery]`) and the
//! presentation settings (`[settings]`):
//!
//! ```toml
//! [lottery]
//! slot_count = 1
//! win_probability = 0.3
//! database = "raffle.db"
//!
//! [settings]
//! color = true
//! format = "table"
//! ```

use crate::error::{CliError, Result};
use raffle_ledger::LotteryConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Event configuration
    #[serde(default)]
    pub lottery: LotteryConfig,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Get the default configuration file path (`~/.raffle/config.toml`).
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".raffle").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default path is used
    /// if present, otherwise built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Self::path()?;
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.lottery.validate()?;
        Ok(config)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.settings.color);
        assert_eq!(config.settings.format, OutputFormat::Table);
        assert_eq!(config.lottery.event_key, "lottery_data");
    }

    #[test]
    fn test_parse_both_sections() {
        let config = Config::from_toml_str(
            r#"
            [lottery]
            slot_count = 2
            win_probability = 0.5

            [settings]
            color = false
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.lottery.slot_count, 2);
        assert_eq!(config.lottery.win_probability, 0.5);
        assert_eq!(config.lottery.duration_days, 90);
        assert!(!config.settings.color);
        assert_eq!(config.settings.format, OutputFormat::Json);
    }

    #[test]
    fn test_invalid_lottery_rejected() {
        let result = Config::from_toml_str("[lottery]\nslot_count = 0\n");
        assert!(matches!(result, Err(CliError::Lottery(_))));
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let result = Config::load(Some(Path::new("/nonexistent/raffle.toml")));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[lottery]\nevent_key = \"spring\"").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.lottery.event_key, "spring");
        assert!(config.settings.color);
    }
}
