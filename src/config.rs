use std::env;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Thresholds from the institution's attendance settings.
///
/// Carried into the engine but not applied: status derivation only looks at
/// whether check-in and check-out were recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttendanceSettings {
    pub late_threshold_minutes: u32,
    pub early_leave_threshold_minutes: u32,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub api_prefix: String,
    pub db_max_connections: u32,
    pub log_dir: String,

    // Reconciliation schedule
    pub reconcile_interval: Duration,
    pub reconcile_timeout: Duration,

    // Rate limiting for check-in / check-out
    pub rate_capture_per_min: u32,

    pub attendance: AttendanceSettings,
}

fn var_or_with<T: FromStr>(
    lookup: impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

fn var_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    var_or_with(|name| env::var(name).ok(), name, default)
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            db_max_connections: var_or("DB_MAX_CONNECTIONS", 5)?,
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),

            // 5 min
            reconcile_interval: Duration::from_secs(var_or("RECONCILE_INTERVAL_SECS", 300)?),
            reconcile_timeout: Duration::from_secs(var_or("RECONCILE_TIMEOUT_SECS", 240)?),

            rate_capture_per_min: var_or("RATE_CAPTURE_PER_MIN", 120)?,

            attendance: AttendanceSettings {
                late_threshold_minutes: var_or("LATE_THRESHOLD_MINUTES", 0)?,
                early_leave_threshold_minutes: var_or("EARLY_LEAVE_THRESHOLD_MINUTES", 0)?,
            },
        })
    }
}
