//! Structured logging with a runtime-adjustable threshold.
//!
//! The level filter sits behind a [`reload`] layer so the threshold can be
//! raised or lowered while the process runs. The formatting layer writes to
//! any [`MakeWriter`], which is how the destination is plugged in.

use crate::config::parse_level;
use crate::{TelemetryConfig, TelemetryError};
use tracing::Subscriber;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{reload, Registry};

/// A fully assembled subscriber, ready to install.
pub type BoxedSubscriber = Box<dyn Subscriber + Send + Sync + 'static>;

/// Adjusts the minimum severity of a subscriber built by this crate.
#[derive(Debug, Clone)]
pub struct LogLevelHandle {
    handle: reload::Handle<LevelFilter, Registry>,
}

impl LogLevelHandle {
    /// Change the minimum severity.
    ///
    /// # Errors
    ///
    /// [`TelemetryError::Reload`] if the subscriber has been dropped.
    pub fn set_level(&self, level: LevelFilter) -> Result<(), TelemetryError> {
        self.handle
            .modify(|filter| *filter = level)
            .map_err(|e| TelemetryError::Reload(e.to_string()))?;
        tracing::debug!(level = %level, "Log level changed");
        Ok(())
    }

    /// Change the minimum severity by name.
    ///
    /// # Errors
    ///
    /// [`TelemetryError::InvalidLevel`] for an unknown name,
    /// [`TelemetryError::Reload`] if the subscriber has been dropped.
    pub fn set_level_str(&self, level: &str) -> Result<(), TelemetryError> {
        self.set_level(parse_level(level)?)
    }

    /// The current minimum severity, or `None` if the subscriber is gone.
    #[must_use]
    pub fn level(&self) -> Option<LevelFilter> {
        self.handle.clone_current()
    }
}

/// Build a subscriber writing to `writer` without installing it.
///
/// # Errors
///
/// [`TelemetryError::InvalidLevel`] if `config.log_level` does not parse.
pub fn build_subscriber<W>(
    config: &TelemetryConfig,
    writer: W,
) -> Result<(BoxedSubscriber, LogLevelHandle), TelemetryError>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let (filter, handle) = reload::Layer::new(config.level_filter()?);
    let base = tracing_subscriber::registry().with(filter);

    let subscriber: BoxedSubscriber = if config.json_logs {
        // One JSON object per line
        let json_layer = fmt::layer()
            .json()
            .with_target(config.with_target)
            .with_current_span(false)
            .with_writer(writer);
        Box::new(base.with(json_layer))
    } else {
        // Human-readable text
        let fmt_layer = fmt::layer()
            .with_target(config.with_target)
            .with_ansi(config.ansi)
            .with_writer(writer);
        Box::new(base.with(fmt_layer))
    };

    Ok((subscriber, LogLevelHandle { handle }))
}

/// Install the default sink: text records on standard error.
///
/// # Errors
///
/// [`TelemetryError::InvalidLevel`] for a bad level,
/// [`TelemetryError::AlreadyInitialized`] if a global subscriber is already set.
pub fn init_logging(config: &TelemetryConfig) -> Result<LogLevelHandle, TelemetryError> {
    init_logging_with_writer(config, std::io::stderr)
}

/// Install a global subscriber writing to `writer`.
///
/// # Errors
///
/// As [`init_logging`].
pub fn init_logging_with_writer<W>(
    config: &TelemetryConfig,
    writer: W,
) -> Result<LogLevelHandle, TelemetryError>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let (subscriber, handle) = build_subscriber(config, writer)?;
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;

    tracing::debug!(
        service = %config.service_name,
        level = %config.log_level,
        json_logs = config.json_logs,
        "Logging initialized"
    );

    Ok(handle)
}
