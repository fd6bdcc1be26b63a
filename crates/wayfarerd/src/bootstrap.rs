//! Daemon startup orchestration.

use std::io::{BufRead, Write};
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;

use wayfarer_config::Config;
use wayfarer_core::{EngineLoader, Instance, OpenError};

use crate::dispatch::{DispatchError, Session, SessionSummary};
use crate::health::HealthReporter;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the daemon configuration.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader that hands out a fixed configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps an already resolved configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during startup.
#[derive(Debug, Error)]
pub enum StartupError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// No dataset directory was configured.
    #[error("no dataset configured; pass --dataset or set WAYFARER_DATASET")]
    MissingDataset,
    /// The dataset could not be opened.
    #[error("failed to open dataset: {source}")]
    Open {
        /// Underlying open error.
        #[source]
        source: OpenError,
    },
}

/// A started gateway: resolved configuration plus the open instance.
pub struct Daemon {
    config: Config,
    instance: Instance,
    telemetry: TelemetryHandle,
    reporter: Arc<dyn HealthReporter>,
}

impl Daemon {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Accessor for the open instance.
    #[must_use]
    pub const fn instance(&self) -> &Instance {
        &self.instance
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub const fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Runs one command session over the supplied streams until end of input.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Io`] when the protocol streams fail.
    pub fn serve<R: BufRead, W: Write>(
        &self,
        input: R,
        output: W,
    ) -> Result<SessionSummary, DispatchError> {
        let session = Session::new(&self.instance, self.config.max_request_bytes());
        let summary = session.run(input, output)?;
        self.reporter.session_closed(&summary);
        Ok(summary)
    }

    /// Releases the instance.
    pub fn shutdown(self) {
        self.instance.close();
    }
}

/// Starts the daemon using the supplied collaborators.
///
/// # Errors
///
/// Returns [`StartupError`] when configuration, telemetry or the dataset fail
/// to initialise. The failure is reported to `reporter` before returning.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    engines: &dyn EngineLoader,
) -> Result<Daemon, StartupError> {
    reporter.startup_starting();
    match start(loader, engines) {
        Ok((config, instance, telemetry)) => {
            reporter.startup_succeeded(&config, instance.subsystems());
            Ok(Daemon {
                config,
                instance,
                telemetry,
                reporter,
            })
        }
        Err(error) => {
            reporter.startup_failed(&error);
            Err(error)
        }
    }
}

fn start(
    loader: &dyn ConfigLoader,
    engines: &dyn EngineLoader,
) -> Result<(Config, Instance, TelemetryHandle), StartupError> {
    let config = loader
        .load()
        .map_err(|source| StartupError::Configuration { source })?;
    let telemetry =
        telemetry::initialise(&config).map_err(|source| StartupError::Telemetry { source })?;
    let dataset = config.dataset().ok_or(StartupError::MissingDataset)?;
    let instance =
        Instance::open(dataset, engines).map_err(|source| StartupError::Open { source })?;
    Ok((config, instance, telemetry))
}
