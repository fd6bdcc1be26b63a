//! Loaded dataset handle and the typed call surface.

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use camino::Utf8Path;
use serde_json::Value;
use tracing::{debug, info, warn};

use wayfarer_types::{BinaryPayload, Coordinate, Location, Route};

use crate::codec;
use crate::engine::{Engine, EngineLoader, HandlerFault, TileCoord};
use crate::error::{GatewayError, OpenError, Unavailable};
use crate::gate;
use crate::project;
use crate::request::{self, ApiRequest, RouteQuery};
use crate::routes::{GLYPH_REQUIREMENTS, RouteTable, TILE_REQUIREMENTS};
use crate::subsystem::Subsystems;

const INSTANCE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::instance");

/// Outcome of a path dispatch that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// The handler ran and returned this JSON value.
    Payload(Value),
    /// The handler's subsystems are not loaded.
    Unavailable(Unavailable),
}

/// Read-only handle to a loaded dataset.
///
/// Cloning is cheap and shares the underlying engine, so several command loops
/// can serve from one instance. The gateway never mutates it.
#[derive(Clone)]
pub struct Instance {
    engine: Arc<dyn Engine>,
    routes: Arc<RouteTable>,
}

impl fmt::Debug for Instance {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Instance")
            .field("subsystems", &self.engine.subsystems())
            .field("routes", &self.routes.len())
            .finish()
    }
}

impl Instance {
    /// Loads the dataset at `path` through `loader`.
    ///
    /// # Errors
    ///
    /// Returns an [`OpenError`] when the loader rejects the dataset.
    pub fn open(path: &Utf8Path, loader: &dyn EngineLoader) -> Result<Self, OpenError> {
        info!(target: INSTANCE_TARGET, dataset = %path, "opening dataset");
        let engine = loader.load(path).inspect_err(|error| {
            warn!(target: INSTANCE_TARGET, dataset = %path, %error, "dataset failed to open");
        })?;
        let instance = Self::from_engine(engine)?;
        info!(
            target: INSTANCE_TARGET,
            dataset = %path,
            subsystems = %instance.subsystems(),
            "dataset opened"
        );
        Ok(instance)
    }

    /// Wraps an already loaded engine.
    ///
    /// # Errors
    ///
    /// Returns [`OpenError::RouteTable`] if the dispatch table is inconsistent.
    pub fn from_engine(engine: Arc<dyn Engine>) -> Result<Self, OpenError> {
        Ok(Self {
            engine,
            routes: Arc::new(RouteTable::standard()?),
        })
    }

    /// Releases this handle. The engine is dropped with its last handle.
    pub fn close(self) {
        debug!(
            target: INSTANCE_TARGET,
            handles = Arc::strong_count(&self.engine),
            "closing instance handle"
        );
    }

    /// Subsystems loaded for this dataset.
    #[must_use]
    pub fn subsystems(&self) -> Subsystems {
        self.engine.subsystems()
    }

    /// Plans itineraries departing now, or at `departure_time` when given.
    ///
    /// Missing subsystems and handler faults both yield an empty list.
    #[must_use]
    pub fn plan_route(
        &self,
        from: Coordinate,
        to: Coordinate,
        departure_time: Option<&str>,
    ) -> Vec<Route> {
        self.plan_route_with(&RouteQuery {
            departure_time: departure_time.map(str::to_owned),
            ..RouteQuery::between(from, to)
        })
    }

    /// Plans itineraries for a fully specified query.
    #[must_use]
    pub fn plan_route_with(&self, query: &RouteQuery) -> Vec<Route> {
        self.try_plan_route(query)
            .unwrap_or_else(|error| absorb(&error))
    }

    /// Plans itineraries, reporting faults instead of absorbing them.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the handler fails or panics.
    pub fn try_plan_route(&self, query: &RouteQuery) -> Result<Vec<Route>, GatewayError> {
        Ok(self
            .typed(&request::plan(query))?
            .map(|payload| project::routes(&payload))
            .unwrap_or_default())
    }

    /// Geocodes free text. Missing subsystems and faults yield an empty list.
    #[must_use]
    pub fn geocode(&self, query: &str) -> Vec<Location> {
        self.try_geocode(query)
            .unwrap_or_else(|error| absorb(&error))
    }

    /// Geocodes free text, reporting faults instead of absorbing them.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the handler fails or panics.
    pub fn try_geocode(&self, query: &str) -> Result<Vec<Location>, GatewayError> {
        Ok(self
            .typed(&request::geocode(query))?
            .map(|payload| project::forward_locations(&payload))
            .unwrap_or_default())
    }

    /// Finds the place nearest to `pos`, if the reverse index can tell.
    #[must_use]
    pub fn reverse_geocode(&self, pos: Coordinate) -> Option<Location> {
        self.try_reverse_geocode(pos)
            .unwrap_or_else(|error| absorb(&error))
    }

    /// Reverse geocodes, reporting faults instead of absorbing them.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the handler fails or panics.
    pub fn try_reverse_geocode(&self, pos: Coordinate) -> Result<Option<Location>, GatewayError> {
        Ok(self
            .typed(&request::reverse_geocode(pos))?
            .and_then(|payload| project::reverse_location(&payload)))
    }

    /// Fetches a vector tile. Invalid indices, missing stores and faults all
    /// report `found: false`.
    #[must_use]
    pub fn get_tile(&self, z: i64, x: i64, y: i64) -> BinaryPayload {
        self.try_get_tile(z, x, y)
            .unwrap_or_else(|error| absorb(&error))
    }

    /// Fetches a vector tile, reporting faults instead of absorbing them.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Resource`] if the engine fails or panics.
    pub fn try_get_tile(&self, z: i64, x: i64, y: i64) -> Result<BinaryPayload, GatewayError> {
        let Some(tile) = TileCoord::from_signed(z, x, y) else {
            debug!(target: INSTANCE_TARGET, z, x, y, "tile index out of range");
            return Ok(BinaryPayload::missing());
        };
        if let Err(unavailable) = gate::check(TILE_REQUIREMENTS, self.subsystems()) {
            debug!(target: INSTANCE_TARGET, %tile, %unavailable, "tile store not loaded");
            return Ok(BinaryPayload::missing());
        }
        let bytes = guarded(|| self.engine.tile(tile))
            .map_err(|fault| GatewayError::resource("tile", fault))?;
        Ok(codec::payload(bytes.as_deref()))
    }

    /// Fetches a glyph range named by a style URL path such as
    /// `/tiles/glyphs/Noto Sans Regular/0-255.pbf`.
    #[must_use]
    pub fn get_glyph(&self, path: &str) -> BinaryPayload {
        self.try_get_glyph(path)
            .unwrap_or_else(|error| absorb(&error))
    }

    /// Fetches a glyph range, reporting faults instead of absorbing them.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Resource`] if the engine fails or panics.
    pub fn try_get_glyph(&self, path: &str) -> Result<BinaryPayload, GatewayError> {
        let Some(resource) = request::glyph_resource(path) else {
            debug!(target: INSTANCE_TARGET, path, "not a glyph path");
            return Ok(BinaryPayload::missing());
        };
        if let Err(unavailable) = gate::check(GLYPH_REQUIREMENTS, self.subsystems()) {
            debug!(target: INSTANCE_TARGET, %resource, %unavailable, "glyph store not loaded");
            return Ok(BinaryPayload::missing());
        }
        let bytes = guarded(|| self.engine.glyph(&resource))
            .map_err(|fault| GatewayError::resource("glyph", fault))?;
        Ok(codec::payload(bytes.as_deref()))
    }

    /// Runs a raw `path?query` request and returns the handler's JSON text.
    ///
    /// Unknown paths, missing subsystems and faults all yield `None`; use
    /// [`Self::dispatch`] to tell them apart.
    #[must_use]
    pub fn api_get(&self, path_and_query: &str) -> Option<String> {
        match self.dispatch(path_and_query) {
            Ok(Dispatch::Payload(payload)) => Some(payload.to_string()),
            Ok(Dispatch::Unavailable(_)) => None,
            Err(error) => absorb(&error),
        }
    }

    /// Routes a raw `path?query` request through the dispatch table.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MalformedPath`] or [`GatewayError::NotFound`]
    /// for requests that cannot be routed, [`GatewayError::Handler`] when the
    /// handler fails or panics, and [`GatewayError::InvalidPayload`] when it
    /// returns something other than JSON.
    pub fn dispatch(&self, path_and_query: &str) -> Result<Dispatch, GatewayError> {
        let request = ApiRequest::parse(path_and_query)?;
        let route = self
            .routes
            .resolve(request.path())
            .ok_or_else(|| GatewayError::not_found(request.path()))?;
        if let Err(unavailable) = gate::check(route.required, self.subsystems()) {
            debug!(
                target: INSTANCE_TARGET,
                endpoint = %route.endpoint,
                %unavailable,
                "endpoint unavailable"
            );
            return Ok(Dispatch::Unavailable(unavailable));
        }
        let body = guarded(|| self.engine.serve(route.endpoint, &request))
            .map_err(|fault| GatewayError::handler(route.endpoint, fault))?;
        let payload =
            serde_json::from_str(&body).map_err(|source| GatewayError::InvalidPayload {
                path: request.path().to_owned(),
                source,
            })?;
        Ok(Dispatch::Payload(payload))
    }

    fn typed(&self, path_and_query: &str) -> Result<Option<Value>, GatewayError> {
        match self.dispatch(path_and_query)? {
            Dispatch::Payload(payload) => Ok(Some(payload)),
            Dispatch::Unavailable(_) => Ok(None),
        }
    }
}

/// Logs a fault swallowed by the typed surface and yields the empty result.
fn absorb<T: Default>(error: &GatewayError) -> T {
    warn!(target: INSTANCE_TARGET, %error, "request failed");
    T::default()
}

/// Runs an engine call, converting a panic into a [`HandlerFault`].
fn guarded<T>(call: impl FnOnce() -> Result<T, HandlerFault>) -> Result<T, HandlerFault> {
    catch_unwind(AssertUnwindSafe(call)).unwrap_or_else(|panic| {
        Err(HandlerFault::new(format!(
            "handler panicked: {}",
            panic_message(&*panic)
        )))
    })
}

/// Extracts the message carried by a panic payload.
#[must_use]
pub fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
