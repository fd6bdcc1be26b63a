//! Structured telemetry initialisation for the daemon.
//!
//! Stdout carries the command protocol, so log records go to stderr or, when
//! `log_file` is configured, are appended to that file.

use std::fs::{File, OpenOptions};
use std::io::{self, IsTerminal};
use std::sync::Mutex;

use camino::Utf8PathBuf;
use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, writer::BoxMakeWriter};

use wayfarer_config::{Config, LogFormat, LogTarget};

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

/// Handle returned when telemetry has been initialised.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to parse the configured log filter expression.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// The configured log file could not be opened for appending.
    #[error("failed to open log file {path}: {source}")]
    LogFile {
        /// Configured log file.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Failed to install the tracing subscriber.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Destination of log records.
#[derive(Debug)]
enum LogSink {
    Stderr,
    File(File),
}

impl LogSink {
    fn open(config: &Config) -> Result<Self, TelemetryError> {
        let LogTarget::File(path) = config.log_target() else {
            return Ok(Self::Stderr);
        };
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map(Self::File)
            .map_err(|source| TelemetryError::LogFile {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Colour is only used on an interactive stderr.
    fn ansi(&self) -> bool {
        matches!(self, Self::Stderr) && io::stderr().is_terminal()
    }

    fn into_writer(self) -> BoxMakeWriter {
        match self {
            Self::Stderr => BoxMakeWriter::new(io::stderr),
            Self::File(file) => BoxMakeWriter::new(Mutex::new(file)),
        }
    }
}

/// Configures the global tracing subscriber when invoked for the first time.
///
/// Later calls return a fresh [`TelemetryHandle`] without touching the global
/// subscriber again.
///
/// # Examples
///
/// ```rust
/// use wayfarer_config::Config;
/// use wayfarerd::telemetry;
///
/// # fn main() -> Result<(), wayfarerd::TelemetryError> {
/// let config = Config::default();
/// let first = telemetry::initialise(&config)?;
/// let second = telemetry::initialise(&config)?;
/// drop(first);
/// drop(second);
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter does not parse, the log file
/// cannot be opened, or another global subscriber is already installed.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| {
            let subscriber = build_subscriber(config)?;
            tracing::subscriber::set_global_default(subscriber)
                .map_err(TelemetryError::Subscriber)
        })
        .map(|_| TelemetryHandle)
}

fn build_subscriber(
    config: &Config,
) -> Result<Box<dyn Subscriber + Send + Sync>, TelemetryError> {
    let filter = EnvFilter::try_new(config.log_filter())
        .map_err(|error| TelemetryError::Filter(error.to_string()))?;
    let sink = LogSink::open(config)?;
    let ansi = sink.ansi();
    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(sink.into_writer())
        .with_ansi(ansi)
        .with_timer(fmt::time::UtcTime::rfc_3339());

    Ok(match config.log_format() {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    })
}
