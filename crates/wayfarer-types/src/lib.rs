//! External data model shared by the gateway and its hosts.
//!
//! These records are the stable, flattened shapes the gateway hands to
//! embedding hosts and writes on the IPC protocol. They intentionally carry
//! none of the routing engine's internal detail: every optional attribute the
//! engine may leave out is an explicit `Option`, and absent values are
//! omitted from the serialized form rather than written as `null`.

mod envelope;
mod location;
mod payload;
mod route;

pub use envelope::{Envelope, Status};
pub use location::{Area, Location, LocationType, Token};
pub use payload::BinaryPayload;
pub use route::{Leg, Route};

use serde::{Deserialize, Serialize};

/// Geographic position in WGS84 degrees.
///
/// No range validation is performed; out-of-range values are forwarded to the
/// engine unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl Coordinate {
    /// Builds a coordinate from latitude and longitude.
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}
