//! Logging configuration from environment variables.

use crate::TelemetryError;
use std::env;
use tracing_subscriber::filter::LevelFilter;

/// Default service name attached to the initialization record.
pub const DEFAULT_SERVICE_NAME: &str = "mediator";

/// Default minimum severity.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration for the diagnostics sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name recorded when logging is initialized
    pub service_name: String,

    /// Minimum severity (trace, debug, info, warn, error, off)
    pub log_level: String,

    /// Emit one JSON object per record instead of human-readable text
    pub json_logs: bool,

    /// Colorize text output
    pub ansi: bool,

    /// Include the record's target (module path)
    pub with_target: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            json_logs: false,
            ansi: false,
            with_target: true,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `MEDIATOR_SERVICE_NAME`: Service name (default: mediator)
    /// - `MEDIATOR_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `MEDIATOR_JSON_LOGS`: Enable JSON logs (default: false)
    /// - `MEDIATOR_LOG_ANSI`: Enable colored output (default: false)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |key: &str, default: bool| {
            lookup(key)
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(default)
        };

        Self {
            service_name: lookup("MEDIATOR_SERVICE_NAME")
                .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),

            log_level: lookup("MEDIATOR_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),

            json_logs: flag("MEDIATOR_JSON_LOGS", false),

            ansi: flag("MEDIATOR_LOG_ANSI", false),

            with_target: true,
        }
    }

    /// Parse `log_level` into a filter.
    ///
    /// # Errors
    ///
    /// [`TelemetryError::InvalidLevel`] if the value is not a level name.
    pub fn level_filter(&self) -> Result<LevelFilter, TelemetryError> {
        parse_level(&self.log_level)
    }
}

/// Parse a level name (case-insensitive) into a filter.
///
/// # Errors
///
/// [`TelemetryError::InvalidLevel`] if the value is not a level name.
pub fn parse_level(level: &str) -> Result<LevelFilter, TelemetryError> {
    level
        .trim()
        .parse::<LevelFilter>()
        .map_err(|_| TelemetryError::InvalidLevel(level.to_string()))
}
