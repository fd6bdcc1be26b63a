//! The seam between the gateway and the routing engine.
//!
//! Everything behind [`Engine`] is an external collaborator: the router, the
//! geocoder, the tile renderer and the timetable store. The gateway only asks
//! which subsystems are loaded and invokes endpoints whose requirements are
//! satisfied.

use std::fmt;
use std::sync::Arc;

use camino::Utf8Path;
use strum::{Display, EnumIter};
use thiserror::Error;

use crate::error::OpenError;
use crate::request::ApiRequest;
use crate::subsystem::Subsystems;

/// Endpoint handlers exposed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum Endpoint {
    /// Itinerary planning.
    Plan,
    /// Forward geocoding.
    Geocode,
    /// Reverse geocoding.
    ReverseGeocode,
    /// Initial map viewport.
    MapInitial,
    /// Indoor levels within a bounding box.
    MapLevels,
    /// Departures and arrivals at a stop.
    StopTimes,
    /// Details of a single trip.
    Trip,
    /// Trips active within a bounding box and time window.
    MapTrips,
    /// Stops within a bounding box.
    MapStops,
    /// Shared mobility stations and vehicles.
    Rentals,
    /// Reachability from one place to all others.
    OneToAll,
    /// Street routing from one place to many.
    OneToMany,
}

/// Web-mercator tile index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// Zoom level.
    pub z: u32,
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

impl TileCoord {
    /// Deepest zoom level a tile index may address.
    pub const MAX_ZOOM: u32 = 30;

    /// Validates signed tile indices.
    ///
    /// Returns `None` for negative values, zoom levels beyond
    /// [`Self::MAX_ZOOM`], or columns and rows outside the zoom level's grid.
    #[must_use]
    pub fn from_signed(z: i64, x: i64, y: i64) -> Option<Self> {
        let zoom = u32::try_from(z).ok().filter(|zoom| *zoom <= Self::MAX_ZOOM)?;
        let column = u32::try_from(x).ok()?;
        let row = u32::try_from(y).ok()?;
        let extent = 1_u64 << zoom;
        (u64::from(column) < extent && u64::from(row) < extent).then_some(Self {
            z: zoom,
            x: column,
            y: row,
        })
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// Failure raised by an engine handler while processing a request.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HandlerFault {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl HandlerFault {
    /// Builds a fault without an underlying source.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Builds a fault that wraps an underlying source.
    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Human-readable description of the fault.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

/// A loaded routing engine dataset.
///
/// Implementations are shared read-only across command loops, hence the
/// `Send + Sync` bound. Any internal mutation (realtime feeds, caches) must be
/// synchronised by the implementation itself.
pub trait Engine: Send + Sync {
    /// Subsystems loaded for this dataset.
    fn subsystems(&self) -> Subsystems;

    /// Invokes an endpoint handler and returns its JSON response text.
    ///
    /// The gateway only calls this once every subsystem the endpoint requires
    /// is loaded.
    fn serve(&self, endpoint: Endpoint, request: &ApiRequest) -> Result<String, HandlerFault>;

    /// Renders or fetches a vector tile. `Ok(None)` means no tile exists.
    fn tile(&self, tile: TileCoord) -> Result<Option<Vec<u8>>, HandlerFault>;

    /// Fetches a glyph range such as `Noto Sans Regular/0-255.pbf`.
    /// `Ok(None)` means the resource does not exist.
    fn glyph(&self, resource: &str) -> Result<Option<Vec<u8>>, HandlerFault>;
}

/// Opens engine datasets from disk.
pub trait EngineLoader {
    /// Loads the dataset rooted at `path`.
    ///
    /// # Errors
    ///
    /// Returns an [`OpenError`] when the dataset is missing, unreadable or
    /// internally inconsistent.
    fn load(&self, path: &Utf8Path) -> Result<Arc<dyn Engine>, OpenError>;
}
