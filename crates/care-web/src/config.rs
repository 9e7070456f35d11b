//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

use care_core::ScheduleOptions;
use google_sheets::GoogleConfig;
use sheet_core::StoreError;

/// Widest lookback or profile window accepted, in days.
const MAX_WINDOW_DAYS: i64 = 3650;

/// Care web server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// Hide error detail from responses.
    pub production: bool,
    /// Board and profile tuning.
    pub options: ScheduleOptions,
    /// Google API access.
    pub google: GoogleConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `CARE_ADDR` | Server bind address | `127.0.0.1:8790` |
    /// | `APP_ENV` | `production` hides error detail | (development) |
    /// | `SCAN_DELAY_MS` | Pause before each board folder scan | `1000` |
    /// | `RECENT_LOOKBACK_DAYS` | Board only reads sheets modified this recently (1 to 3650) | `14` |
    /// | `PROFILE_WINDOW_DAYS` | Days either side of today on the profile view (0 to 3650) | `7` |
    /// | `GOOGLE_ACCESS_TOKEN` | Bearer token for Sheets and Drive | (required) |
    pub fn from_env() -> Result<Self, ConfigError> {
        let google = GoogleConfig::from_env()?;
        Self::from_lookup(|key| env::var(key).ok(), google)
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        google: GoogleConfig,
    ) -> Result<Self, ConfigError> {
        let addr = lookup("CARE_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8790".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let production = lookup("APP_ENV")
            .map(|v| v.trim().eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let defaults = ScheduleOptions::default();
        let options = ScheduleOptions {
            scan_delay: Duration::from_millis(number(
                &lookup,
                "SCAN_DELAY_MS",
                defaults.scan_delay.as_millis() as u64,
            )?),
            lookback_days: bounded(
                &lookup,
                "RECENT_LOOKBACK_DAYS",
                defaults.lookback_days,
                1..=MAX_WINDOW_DAYS,
            )?,
            profile_window_days: bounded(
                &lookup,
                "PROFILE_WINDOW_DAYS",
                defaults.profile_window_days,
                0..=MAX_WINDOW_DAYS,
            )?,
        };

        Ok(Self {
            addr,
            production,
            options,
            google,
        })
    }
}

fn number<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { key, value }),
        _ => Ok(default),
    }
}

fn bounded(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: i64,
    range: RangeInclusive<i64>,
) -> Result<i64, ConfigError> {
    let value = number(lookup, key, default)?;
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::OutOfRange {
            key,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid CARE_ADDR format")]
    InvalidAddr,

    #[error("{key} must be a number, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },

    #[error("{key} must be between {min} and {max}, got {value}")]
    OutOfRange {
        key: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error(transparent)]
    Google(#[from] StoreError),
}
