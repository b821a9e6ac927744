//! # Mediator Telemetry
//!
//! Default diagnostics sink for the mediator.
//!
//! The registry only emits `tracing` records; this crate decides where they
//! go and how severe a record must be to get there.
//!
//! Nothing is printed until a subscriber is installed: without one the
//! registry's diagnostics are discarded. Calling
//! `init_logging(&TelemetryConfig::default())` once at startup gives the
//! default sink, which is human-readable text on stderr at `info`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mediator_telemetry::{init_logging, TelemetryConfig};
//! use mediator_telemetry::LevelFilter;
//!
//! let config = TelemetryConfig::from_env();
//! let levels = init_logging(&config).expect("Failed to init logging");
//!
//! // Later, without restarting:
//! levels.set_level(LevelFilter::DEBUG)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `MEDIATOR_LOG_LEVEL` | `info` | Minimum severity (falls back to `RUST_LOG`) |
//! | `MEDIATOR_JSON_LOGS` | `false` | JSON records instead of text |
//! | `MEDIATOR_LOG_ANSI` | `false` | Colored text output |
//! | `MEDIATOR_SERVICE_NAME` | `mediator` | Service name in the init record |

#![cfg_attr(test, allow(clippy::unwrap_used))]

mod config;
mod logging;
mod writer;

pub use config::{parse_level, TelemetryConfig, DEFAULT_LOG_LEVEL, DEFAULT_SERVICE_NAME};
pub use logging::{
    build_subscriber, init_logging, init_logging_with_writer, BoxedSubscriber, LogLevelHandle,
};
pub use writer::MemoryWriter;

// Re-exported so callers can name levels without depending on tracing-subscriber.
pub use tracing_subscriber::filter::LevelFilter;

use thiserror::Error;

/// Logging initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(String),

    #[error("Failed to reload log level: {0}")]
    Reload(String),
}
