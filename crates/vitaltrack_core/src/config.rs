//! Application and analyzer configuration.
//!
//! # Responsibility
//! - Hold the explicit correlation constants (lookback window, minimum delay,
//!   reporting threshold).
//! - Resolve runtime settings from `VITALTRACK_*` environment variables.
//!
//! # Invariants
//! - `AnalyzerConfig` values passed to the analyzer are validated:
//!   `lookback_window > 0`, `0 <= min_delay < lookback_window`,
//!   `min_occurrences >= 1`.

use crate::logging::default_log_level;
use chrono::Duration;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Default lookback window in hours.
pub const DEFAULT_LOOKBACK_HOURS: i64 = 6;
/// Default minimum delay between meal and symptom onset, in hours.
pub const DEFAULT_MIN_DELAY_HOURS: i64 = 0;
/// Default minimum number of matches before a candidate is reported.
pub const DEFAULT_MIN_OCCURRENCES: u32 = 1;

pub const ENV_DB_PATH: &str = "VITALTRACK_DB_PATH";
pub const ENV_LOG_DIR: &str = "VITALTRACK_LOG_DIR";
pub const ENV_LOG_LEVEL: &str = "VITALTRACK_LOG_LEVEL";
pub const ENV_LOOKBACK_HOURS: &str = "VITALTRACK_LOOKBACK_HOURS";
pub const ENV_MIN_DELAY_HOURS: &str = "VITALTRACK_MIN_DELAY_HOURS";
pub const ENV_MIN_OCCURRENCES: &str = "VITALTRACK_MIN_OCCURRENCES";

const DEFAULT_DB_FILE_NAME: &str = "vitaltrack.sqlite3";

/// Configuration loading failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
    InvalidWindow(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => write!(f, "invalid value `{value}` for {key}"),
            Self::InvalidWindow(details) => write!(f, "invalid analyzer window: {details}"),
        }
    }
}

impl Error for ConfigError {}

/// Correlation analyzer constants.
///
/// A meal matches a symptom at `t` when
/// `t - lookback_window < meal.timestamp <= t - min_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzerConfig {
    pub lookback_window: Duration,
    pub min_delay: Duration,
    pub min_occurrences: u32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            lookback_window: Duration::hours(DEFAULT_LOOKBACK_HOURS),
            min_delay: Duration::hours(DEFAULT_MIN_DELAY_HOURS),
            min_occurrences: DEFAULT_MIN_OCCURRENCES,
        }
    }
}

impl AnalyzerConfig {
    /// Default config with a custom lookback window.
    pub fn with_lookback(lookback_window: Duration) -> Self {
        Self {
            lookback_window,
            ..Self::default()
        }
    }

    /// Checks the window/threshold invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lookback_window <= Duration::zero() {
            return Err(ConfigError::InvalidWindow(
                "lookback window must be positive".to_string(),
            ));
        }
        if self.min_delay < Duration::zero() || self.min_delay >= self.lookback_window {
            return Err(ConfigError::InvalidWindow(
                "minimum delay must be non-negative and shorter than the lookback window"
                    .to_string(),
            ));
        }
        if self.min_occurrences == 0 {
            return Err(ConfigError::InvalidValue {
                key: ENV_MIN_OCCURRENCES,
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

/// Runtime configuration for front ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    /// Logging stays disabled when `None`.
    pub log_dir: Option<PathBuf>,
    pub log_level: String,
    pub analyzer: AnalyzerConfig,
}

impl AppConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary key lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = read(ENV_DB_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));
        let log_dir = read(ENV_LOG_DIR).map(PathBuf::from);
        let log_level = read(ENV_LOG_LEVEL).unwrap_or_else(|| default_log_level().to_string());

        let lookback_hours = parse_or(
            read(ENV_LOOKBACK_HOURS),
            ENV_LOOKBACK_HOURS,
            DEFAULT_LOOKBACK_HOURS,
        )?;
        let min_delay_hours = parse_or(
            read(ENV_MIN_DELAY_HOURS),
            ENV_MIN_DELAY_HOURS,
            DEFAULT_MIN_DELAY_HOURS,
        )?;
        let min_occurrences = parse_or(
            read(ENV_MIN_OCCURRENCES),
            ENV_MIN_OCCURRENCES,
            DEFAULT_MIN_OCCURRENCES,
        )?;

        let analyzer = AnalyzerConfig {
            lookback_window: hours(ENV_LOOKBACK_HOURS, lookback_hours)?,
            min_delay: hours(ENV_MIN_DELAY_HOURS, min_delay_hours)?,
            min_occurrences,
        };
        analyzer.validate()?;

        Ok(Self {
            db_path,
            log_dir,
            log_level,
            analyzer,
        })
    }
}

fn hours(key: &'static str, value: i64) -> Result<Duration, ConfigError> {
    Duration::try_hours(value).ok_or_else(|| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}
