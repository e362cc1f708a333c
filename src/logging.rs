//! Structured logging setup.
//!
//! The library only emits `tracing` events; binaries and tests that want
//! to see them call [`init_logging`] once. The filter comes from the
//! `U_TIMETABLE_LOG` variable, then `RUST_LOG`, then `info`.

use std::env;
use std::io;
use std::sync::{Mutex, OnceLock, PoisonError};

use thiserror::Error;
use tracing::debug;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directive.
pub const LOG_ENV_VAR: &str = "U_TIMETABLE_LOG";

/// Output format of stderr logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

static LOGGING_FORMAT: OnceLock<LogFormat> = OnceLock::new();
/// Serializes the check-install-record sequence in [`init_logging`].
static INIT_LOCK: Mutex<()> = Mutex::new(());

/// Errors that can arise while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid logging filter: {0}")]
    Filter(#[from] ParseError),
    #[error("failed to install logging subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// Installs the global stderr subscriber.
///
/// The first call wins; later calls, including concurrent ones, return the
/// format already installed.
pub fn init_logging(format: LogFormat) -> Result<LogFormat, LoggingError> {
    if let Some(installed) = LOGGING_FORMAT.get() {
        return Ok(*installed);
    }
    let _guard = INIT_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(installed) = LOGGING_FORMAT.get() {
        return Ok(*installed);
    }
    install(format)?;
    Ok(*LOGGING_FORMAT.get_or_init(|| format))
}

/// Format installed by [`init_logging`], if any.
pub fn current_format() -> Option<LogFormat> {
    LOGGING_FORMAT.get().copied()
}

fn install(format: LogFormat) -> Result<(), LoggingError> {
    let filter = build_filter()?;
    let layer = match format {
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_target(true)
            .with_ansi(false)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(io::stderr)
            .with_target(true)
            .boxed(),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()?;
    debug!(?format, "logging initialized");
    Ok(())
}

fn build_filter() -> Result<EnvFilter, ParseError> {
    if let Ok(directive) = env::var(LOG_ENV_VAR) {
        if !directive.trim().is_empty() {
            return EnvFilter::try_new(directive);
        }
    }
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new("info"),
    }
}
