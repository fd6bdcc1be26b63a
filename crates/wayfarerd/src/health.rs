//! Structured health reporting for daemon lifecycle events.

use std::sync::Arc;

use wayfarer_config::Config;
use wayfarer_core::Subsystems;

use crate::bootstrap::StartupError;
use crate::dispatch::SessionSummary;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn startup_starting(&self);

    /// Invoked once the dataset is open and the daemon can serve commands.
    fn startup_succeeded(&self, config: &Config, subsystems: Subsystems);

    /// Invoked when startup fails.
    fn startup_failed(&self, error: &StartupError);

    /// Invoked when the command loop reaches end of input.
    fn session_closed(&self, summary: &SessionSummary);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn startup_starting(&self) {
        (**self).startup_starting();
    }

    fn startup_succeeded(&self, config: &Config, subsystems: Subsystems) {
        (**self).startup_succeeded(config, subsystems);
    }

    fn startup_failed(&self, error: &StartupError) {
        (**self).startup_failed(error);
    }

    fn session_closed(&self, summary: &SessionSummary) {
        (**self).session_closed(summary);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn startup_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "startup_starting",
            "starting gateway"
        );
    }

    fn startup_succeeded(&self, config: &Config, subsystems: Subsystems) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "startup_succeeded",
            dataset = ?config.dataset(),
            subsystems = %subsystems,
            log_filter = %config.log_filter(),
            log_format = ?config.log_format(),
            max_request_bytes = config.max_request_bytes(),
            "gateway ready"
        );
    }

    fn startup_failed(&self, error: &StartupError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "startup_failed",
            error = %error,
            "gateway startup failed"
        );
    }

    fn session_closed(&self, summary: &SessionSummary) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "session_closed",
            commands = summary.commands,
            failures = summary.failures,
            "command session closed"
        );
    }
}
