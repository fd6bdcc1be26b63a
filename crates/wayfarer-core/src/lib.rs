//! Gateway between embedding hosts and a routing engine dataset.
//!
//! An [`Instance`] wraps a loaded [`Engine`]. Typed calls such as
//! [`Instance::geocode`] are rendered into the canonical `path?query` form,
//! routed through the same dispatch table as raw [`Instance::api_get`] calls,
//! checked against the subsystems the dataset actually loaded, and projected
//! from the engine's response records into the flat
//! [`wayfarer_types`] model.
//!
//! [`open`] loads file-backed snapshot datasets; other engines plug in through
//! [`EngineLoader`] and [`Instance::open`].

pub mod codec;
pub mod dataset;
mod engine;
mod error;
pub mod gate;
mod instance;
mod native;
pub mod project;
pub mod request;
pub mod routes;
mod subsystem;

use camino::Utf8Path;

pub use engine::{Endpoint, Engine, EngineLoader, HandlerFault, TileCoord};
pub use error::{GatewayError, OpenError, Unavailable};
pub use instance::{Dispatch, Instance, panic_message};
pub use request::{ApiRequest, RouteQuery};
pub use routes::{RouteEntry, RouteTable, RouteTableError};
pub use subsystem::{Subsystem, Subsystems};

/// Opens the snapshot dataset rooted at `path`.
///
/// # Errors
///
/// Returns an [`OpenError`] when the dataset is missing or malformed.
pub fn open(path: impl AsRef<Utf8Path>) -> Result<Instance, OpenError> {
    Instance::open(path.as_ref(), &dataset::SnapshotLoader)
}

/// Releases an instance handle.
pub fn close(instance: Instance) {
    instance.close();
}
