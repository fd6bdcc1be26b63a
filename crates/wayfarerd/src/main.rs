//! `wayfarerd` binary entry point.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use wayfarer_core::dataset::SnapshotLoader;
use wayfarer_types::Envelope;
use wayfarerd::{StartupError, StructuredHealthReporter, SystemConfigLoader, bootstrap_with};

fn main() -> ExitCode {
    let reporter = Arc::new(StructuredHealthReporter::new());
    let daemon = match bootstrap_with(&SystemConfigLoader, reporter, &SnapshotLoader) {
        Ok(daemon) => daemon,
        Err(error) => {
            report_startup_failure(&error);
            return ExitCode::FAILURE;
        }
    };

    let outcome = daemon.serve(io::stdin().lock(), io::stdout().lock());
    daemon.shutdown();
    match outcome {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(target: "wayfarerd", %error, "command session aborted");
            ExitCode::FAILURE
        }
    }
}

fn report_startup_failure(error: &StartupError) {
    let envelope = Envelope::error(format!("Failed to initialize: {error}"));
    let mut stdout = io::stdout().lock();
    let written = serde_json::to_writer(&mut stdout, &envelope)
        .map_err(io::Error::from)
        .and_then(|()| stdout.write_all(b"\n"))
        .and_then(|()| stdout.flush());
    if let Err(write_error) = written {
        tracing::error!(target: "wayfarerd", %write_error, "failed to report startup failure");
    }
}
