//! Shared fixtures for the daemon test suites.

use std::ffi::OsString;
use std::fs;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::{OrthoConfig, OrthoError};
use tempfile::TempDir;

use wayfarer_config::Config;
use wayfarer_core::{Instance, Subsystems};

use crate::bootstrap::{ConfigLoader, StartupError};
use crate::dispatch::{Session, SessionSummary};
use crate::health::HealthReporter;

const PLACES: &str = r#"[
    {
        "type": "STOP",
        "name": "Stockholm Central",
        "id": "740000001",
        "lat": 59.3302,
        "lon": 18.0581,
        "modes": ["RAIL", "BUS"]
    },
    {
        "type": "PLACE",
        "name": "Slussen",
        "id": "osm_n_2",
        "lat": 59.3195,
        "lon": 18.0722
    }
]"#;

/// Places-only snapshot dataset in a temporary directory.
pub struct TestDataset {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl TestDataset {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create dataset dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp path");
        fs::write(root.join("config.yml"), "places: places.json\n").expect("write manifest");
        fs::write(root.join("places.json"), PLACES).expect("write places");
        Self { _dir: dir, root }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn open(&self) -> Instance {
        wayfarer_core::open(self.root()).expect("open test dataset")
    }
}

/// Runs `input` through a session and returns the response lines.
pub fn converse(instance: &Instance, max_request_bytes: usize, input: &str) -> (Vec<String>, SessionSummary) {
    let mut output = Vec::new();
    let summary = Session::new(instance, max_request_bytes)
        .run(Cursor::new(input.as_bytes().to_vec()), &mut output)
        .expect("session should reach end of input");
    let text = String::from_utf8(output).expect("responses are utf8");
    (text.lines().map(str::to_owned).collect(), summary)
}

/// Loader that points the daemon at a temporary snapshot dataset.
pub struct TestConfigLoader {
    dataset: TestDataset,
}

impl TestConfigLoader {
    pub fn new() -> Self {
        Self {
            dataset: TestDataset::new(),
        }
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(Config {
            dataset: Some(self.dataset.root().to_path_buf()),
            ..Config::default()
        })
    }
}

/// Loader that intentionally fails by passing invalid CLI arguments.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("wayfarerd"),
            OsString::from("--max-request-bytes"),
            OsString::from("lots"),
        ];
        Config::load_from_iter(args)
    }
}

/// Health events captured by [`RecordingHealthReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    StartupStarting,
    StartupSucceeded(Subsystems),
    StartupFailed(String),
    SessionClosed(SessionSummary),
}

/// Records health events for assertions.
#[derive(Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn startup_starting(&self) {
        self.record(HealthEvent::StartupStarting);
    }

    fn startup_succeeded(&self, _config: &Config, subsystems: Subsystems) {
        self.record(HealthEvent::StartupSucceeded(subsystems));
    }

    fn startup_failed(&self, error: &StartupError) {
        self.record(HealthEvent::StartupFailed(error.to_string()));
    }

    fn session_closed(&self, summary: &SessionSummary) {
        self.record(HealthEvent::SessionClosed(*summary));
    }
}
