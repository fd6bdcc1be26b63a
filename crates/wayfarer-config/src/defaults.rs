/// Default log filter expression used by the daemon.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default bound on a single request line (1 MiB).
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 1024 * 1024;

/// Default log filter expression used by the daemon.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the daemon.
#[must_use]
pub fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Json
}
