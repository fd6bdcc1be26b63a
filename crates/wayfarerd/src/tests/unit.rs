//! Startup sequence and health reporting.

use std::io::Cursor;
use std::sync::Arc;

use camino::Utf8PathBuf;
use rstest::rstest;

use wayfarer_config::Config;
use wayfarer_core::dataset::SnapshotLoader;
use wayfarer_core::{OpenError, Subsystem};

use super::support::{
    FailingConfigLoader, HealthEvent, RecordingHealthReporter, TestConfigLoader,
};
use crate::bootstrap::{ConfigLoader, StartupError, StaticConfigLoader, bootstrap_with};
use crate::dispatch::SessionSummary;

fn start(
    loader: &dyn ConfigLoader,
) -> (Result<crate::Daemon, StartupError>, Arc<RecordingHealthReporter>) {
    let reporter = Arc::new(RecordingHealthReporter::default());
    let outcome = bootstrap_with(loader, reporter.clone(), &SnapshotLoader);
    (outcome, reporter)
}

#[rstest]
fn startup_opens_the_configured_dataset() {
    let loader = TestConfigLoader::new();
    let (outcome, reporter) = start(&loader);
    let daemon = outcome.expect("startup should succeed");
    let subsystems = daemon.instance().subsystems();
    assert!(subsystems.contains(Subsystem::GeocodeText));
    assert!(!subsystems.contains(Subsystem::Timetable));
    assert_eq!(
        reporter.events(),
        vec![
            HealthEvent::StartupStarting,
            HealthEvent::StartupSucceeded(subsystems),
        ]
    );
    daemon.shutdown();
}

#[rstest]
fn configuration_errors_are_reported() {
    let (outcome, reporter) = start(&FailingConfigLoader);
    let Err(error) = outcome else {
        panic!("startup should fail");
    };
    assert!(matches!(error, StartupError::Configuration { .. }));
    let events = reporter.events();
    assert_eq!(events.first(), Some(&HealthEvent::StartupStarting));
    assert!(matches!(events.get(1), Some(HealthEvent::StartupFailed(_))));
    assert_eq!(events.len(), 2);
}

#[rstest]
fn a_dataset_must_be_configured() {
    let (outcome, reporter) = start(&StaticConfigLoader::new(Config::default()));
    assert!(matches!(outcome, Err(StartupError::MissingDataset)));
    assert_eq!(
        reporter.events().last(),
        Some(&HealthEvent::StartupFailed(String::from(
            "no dataset configured; pass --dataset or set WAYFARER_DATASET"
        )))
    );
}

#[rstest]
fn missing_dataset_directories_fail_to_open() {
    let config = Config {
        dataset: Some(Utf8PathBuf::from("/nonexistent/wayfarer/dataset")),
        ..Config::default()
    };
    let (outcome, _) = start(&StaticConfigLoader::new(config));
    let Err(error) = outcome else {
        panic!("startup should fail");
    };
    assert!(matches!(
        error,
        StartupError::Open {
            source: OpenError::MissingDataset { .. }
        }
    ));
    assert!(error.to_string().starts_with("failed to open dataset: "));
}

#[rstest]
fn serving_reports_the_closed_session() {
    let loader = TestConfigLoader::new();
    let (outcome, reporter) = start(&loader);
    let daemon = outcome.expect("startup should succeed");
    let mut output = Vec::new();
    let summary = daemon
        .serve(
            Cursor::new(b"{\"cmd\":\"geocode\",\"query\":\"Slussen\"}\n{\"cmd\":\"nope\"}\n".to_vec()),
            &mut output,
        )
        .expect("serve until end of input");
    assert_eq!(
        summary,
        SessionSummary {
            commands: 2,
            failures: 1
        }
    );
    assert_eq!(
        reporter.events().last(),
        Some(&HealthEvent::SessionClosed(summary))
    );
    daemon.shutdown();
}
