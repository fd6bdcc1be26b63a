//! Error types for dataset loading and request dispatch.

use std::fmt;

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::engine::{Endpoint, HandlerFault};
use crate::routes::RouteTableError;
use crate::subsystem::{Subsystem, Subsystems};

/// Failure to open a dataset.
#[derive(Debug, Error)]
pub enum OpenError {
    /// The dataset directory does not exist or is not a directory.
    #[error("dataset directory '{path}' does not exist")]
    MissingDataset {
        /// Requested dataset path.
        path: Utf8PathBuf,
    },
    /// A dataset file could not be read.
    #[error("failed to read '{path}': {source}")]
    Read {
        /// File that failed to read.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The dataset manifest is malformed.
    #[error("invalid dataset manifest '{path}': {message}")]
    Manifest {
        /// Manifest path.
        path: Utf8PathBuf,
        /// Parser diagnostic.
        message: String,
    },
    /// A configured dataset artefact is missing or malformed.
    #[error("invalid dataset artefact '{path}': {message}")]
    Artefact {
        /// Artefact path.
        path: Utf8PathBuf,
        /// What was wrong with it.
        message: String,
    },
    /// The endpoint dispatch table is inconsistent.
    #[error(transparent)]
    RouteTable(#[from] RouteTableError),
}

impl OpenError {
    /// Creates a manifest error.
    pub fn manifest(path: impl Into<Utf8PathBuf>, message: impl Into<String>) -> Self {
        Self::Manifest {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates an artefact error.
    pub fn artefact(path: impl Into<Utf8PathBuf>, message: impl Into<String>) -> Self {
        Self::Artefact {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A call could not run because required subsystems are not loaded.
///
/// This is an expected outcome for partially built datasets, not a fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unavailable {
    missing: Subsystems,
}

impl Unavailable {
    /// Records the subsystems that were required but absent.
    #[must_use]
    pub fn new(missing: Subsystems) -> Self {
        Self { missing }
    }

    /// Subsystems that were required but not loaded.
    #[must_use]
    pub fn missing(&self) -> Subsystems {
        self.missing
    }

    /// Whether `subsystem` is among the missing ones.
    #[must_use]
    pub fn is_missing(&self, subsystem: Subsystem) -> bool {
        self.missing.contains(subsystem)
    }
}

impl fmt::Display for Unavailable {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "missing subsystems: {}", self.missing)
    }
}

/// Errors surfaced by path dispatch.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The path is not a valid `path?query` request.
    #[error("malformed request path '{input}': {reason}")]
    MalformedPath {
        /// Raw input.
        input: String,
        /// Why it was rejected.
        reason: &'static str,
    },
    /// No dispatch-table entry matches the path.
    #[error("Unknown endpoint: {path}")]
    NotFound {
        /// Path component of the request.
        path: String,
    },
    /// The handler failed while processing the request.
    #[error("{endpoint} handler failed: {source}")]
    Handler {
        /// Endpoint whose handler failed.
        endpoint: Endpoint,
        /// Fault reported by the handler.
        #[source]
        source: HandlerFault,
    },
    /// The engine failed while fetching a tile or glyph.
    #[error("{resource} lookup failed: {source}")]
    Resource {
        /// Kind of resource requested.
        resource: &'static str,
        /// Fault reported by the engine.
        #[source]
        source: HandlerFault,
    },
    /// The handler returned text that is not JSON.
    #[error("Endpoint did not return valid JSON: {path}")]
    InvalidPayload {
        /// Path component of the request.
        path: String,
        /// Parser diagnostic.
        #[source]
        source: serde_json::Error,
    },
}

impl GatewayError {
    /// Creates a malformed path error.
    pub fn malformed(input: impl Into<String>, reason: &'static str) -> Self {
        Self::MalformedPath {
            input: input.into(),
            reason,
        }
    }

    /// Creates a not-found error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Creates a handler error.
    #[must_use]
    pub fn handler(endpoint: Endpoint, source: HandlerFault) -> Self {
        Self::Handler { endpoint, source }
    }

    /// Creates a tile or glyph lookup error.
    #[must_use]
    pub fn resource(resource: &'static str, source: HandlerFault) -> Self {
        Self::Resource { resource, source }
    }
}
