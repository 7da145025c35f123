use crate::retry::RetryPolicy;
use anyhow::{Context, Result, bail};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Engine configuration, loaded from TOML. Every field has a
/// default so an empty file (or no file) is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub windows: WindowConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Reference timezone as a fixed offset east of UTC, in minutes.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    /// First day of the ranking week (`monday` .. `sunday`).
    #[serde(default = "default_week_start")]
    pub week_start: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            week_start: default_week_start(),
        }
    }
}

impl WindowConfig {
    /// Parse the configured week start.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not an English weekday name.
    pub fn week_start(&self) -> Result<Weekday> {
        match self.week_start.to_ascii_lowercase().as_str() {
            "monday" | "mon" => Ok(Weekday::Mon),
            "tuesday" | "tue" => Ok(Weekday::Tue),
            "wednesday" | "wed" => Ok(Weekday::Wed),
            "thursday" | "thu" => Ok(Weekday::Thu),
            "friday" | "fri" => Ok(Weekday::Fri),
            "saturday" | "sat" => Ok(Weekday::Sat),
            "sunday" | "sun" => Ok(Weekday::Sun),
            other => bail!("invalid week_start {other:?}: expected a weekday name"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Cap applied to every leaderboard request.
    #[serde(default = "default_max_leaderboard_size")]
    pub max_leaderboard_size: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            max_leaderboard_size: default_max_leaderboard_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_retry_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_retry_max_attempts(),
            base_delay_ms: default_retry_base_delay_ms(),
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parse config file {}", path.display()))
    }

    /// Load configuration if the file exists, defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error only if an existing file fails to parse.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("chatfight.db")
}

fn default_week_start() -> String {
    "monday".to_string()
}

const fn default_max_leaderboard_size() -> usize {
    10
}

const fn default_retry_max_attempts() -> u32 {
    4
}

const fn default_retry_base_delay_ms() -> u64 {
    25
}
