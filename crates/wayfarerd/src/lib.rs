//! Command-loop host for the Wayfarer gateway.
//!
//! `wayfarerd` opens one dataset at startup and then serves a line-delimited
//! JSON protocol on stdin/stdout until the host closes its end of the pipe.
//! Structured telemetry goes to stderr, or to the configured log file, so it
//! never interleaves with protocol responses.
//!
//! Startup loads the layered [`wayfarer_config::Config`], installs the
//! tracing subscriber, and opens the configured dataset. Each stage reports
//! through a [`HealthReporter`], and a failure at any stage is returned as a
//! [`StartupError`] for the binary to write as its single error envelope.
//!
//! The [`dispatch`] module holds the protocol itself and can be driven over
//! any [`std::io::BufRead`]/[`std::io::Write`] pair, which is how the test
//! suite exercises it.

mod bootstrap;
pub mod dispatch;
mod health;
pub mod telemetry;

pub use bootstrap::{
    ConfigLoader, Daemon, StartupError, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use dispatch::{DispatchError, Session, SessionSummary};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
