//! Shared configuration for the Wayfarer gateway.
//!
//! Configuration is layered by `ortho_config`: defaults, then configuration
//! files, then `WAYFARER_*` environment variables, then command-line flags.
//! The daemon resolves a single [`Config`] at startup and never reloads it.

mod defaults;
mod logging;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_MAX_REQUEST_BYTES, default_log_filter, default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError, LogTarget};

/// Resolved gateway configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "WAYFARER")]
pub struct Config {
    /// Dataset directory opened at startup.
    #[serde(default)]
    pub dataset: Option<Utf8PathBuf>,
    /// `tracing` filter expression, for example `info` or `wayfarerd=debug`.
    #[serde(default)]
    pub log_filter: Option<String>,
    /// Output format for log records.
    #[serde(default)]
    pub log_format: Option<LogFormat>,
    /// File that receives log records instead of stderr. Stdout is reserved
    /// for the command protocol, so it is never a log destination.
    #[serde(default)]
    pub log_file: Option<Utf8PathBuf>,
    /// Upper bound on the size of a single IPC request line.
    #[serde(default)]
    pub max_request_bytes: Option<usize>,
}

impl Config {
    /// Dataset directory, when one was configured.
    #[must_use]
    pub fn dataset(&self) -> Option<&Utf8Path> {
        self.dataset.as_deref()
    }

    /// Effective log filter.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    /// Effective log format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format.unwrap_or_else(default_log_format)
    }

    /// Log file, when records should not go to stderr.
    #[must_use]
    pub fn log_file(&self) -> Option<&Utf8Path> {
        self.log_file.as_deref()
    }

    /// Effective destination of log records.
    #[must_use]
    pub fn log_target(&self) -> LogTarget<'_> {
        LogTarget::from_log_file(self.log_file())
    }

    /// Effective request line limit in bytes.
    #[must_use]
    pub fn max_request_bytes(&self) -> usize {
        self.max_request_bytes
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_MAX_REQUEST_BYTES)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn defaults_apply_when_unset() {
        let config = Config::default();
        assert_eq!(config.log_filter(), "info");
        assert_eq!(config.log_format(), LogFormat::Json);
        assert_eq!(config.max_request_bytes(), 1024 * 1024);
        assert!(config.dataset().is_none());
        assert!(config.log_file().is_none());
    }

    #[rstest]
    fn zero_request_limit_falls_back_to_default() {
        let config = Config {
            max_request_bytes: Some(0),
            ..Config::default()
        };
        assert_eq!(config.max_request_bytes(), DEFAULT_MAX_REQUEST_BYTES);
    }

    #[rstest]
    fn explicit_values_win() {
        let config = Config {
            dataset: Some(Utf8PathBuf::from("/srv/sweden")),
            log_filter: Some(String::from("debug")),
            log_format: Some(LogFormat::Compact),
            log_file: Some(Utf8PathBuf::from("/var/log/wayfarer.log")),
            max_request_bytes: Some(4096),
        };
        assert_eq!(config.dataset(), Some(Utf8Path::new("/srv/sweden")));
        assert_eq!(config.log_filter(), "debug");
        assert_eq!(config.log_format(), LogFormat::Compact);
        assert_eq!(config.log_file(), Some(Utf8Path::new("/var/log/wayfarer.log")));
        assert_eq!(config.max_request_bytes(), 4096);
    }
}
