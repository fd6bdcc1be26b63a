//! Projection of engine responses onto the external data model.
//!
//! Each nested record is decoded on its own so one malformed itinerary or
//! match only removes itself from the result. Order is always preserved.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use wayfarer_types::{Area, Coordinate, Leg, Location, LocationType, Route, Token};

use crate::native::{self, Itinerary, Match, NativeArea, NativeLeg, PlanResponse};

const PROJECT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::project");

/// Projects a plan response into routes.
#[must_use]
pub fn routes(response: &Value) -> Vec<Route> {
    let Some(plan) = decode::<PlanResponse>(response, "plan response") else {
        return Vec::new();
    };
    plan.itineraries
        .iter()
        .filter_map(|raw| decode::<Itinerary>(raw, "itinerary"))
        .map(route)
        .collect()
}

/// Projects a forward geocode response into locations.
///
/// Location types the projector does not know are dropped from the record,
/// not the record itself.
#[must_use]
pub fn forward_locations(response: &Value) -> Vec<Location> {
    matches(response).map(location).collect()
}

/// Projects a reverse geocode response into its best location.
///
/// The first match that decodes and carries a known location type wins.
#[must_use]
pub fn reverse_location(response: &Value) -> Option<Location> {
    matches(response)
        .map(location)
        .find(|candidate| candidate.kind.is_some())
}

fn matches(response: &Value) -> impl Iterator<Item = Match> + '_ {
    let items: &[Value] = if let Some(items) = response.as_array() {
        items
    } else {
        warn!(
            target: PROJECT_TARGET,
            "geocode response is not an array of matches"
        );
        &[]
    };
    items
        .iter()
        .filter_map(|raw| decode::<Match>(raw, "geocode match"))
}

fn decode<T: DeserializeOwned>(raw: &Value, what: &'static str) -> Option<T> {
    T::deserialize(raw)
        .inspect_err(|error| {
            warn!(target: PROJECT_TARGET, record = what, %error, "dropping malformed record");
        })
        .ok()
}

fn route(itinerary: Itinerary) -> Route {
    Route {
        duration_seconds: itinerary.duration,
        transfers: itinerary.transfers,
        legs: itinerary.legs.into_iter().map(leg).collect(),
    }
}

fn leg(native: NativeLeg) -> Leg {
    Leg {
        mode: native::mode_label(&native.mode).to_owned(),
        from_name: native.from.name,
        to_name: native.to.name,
        from: Coordinate::new(native.from.lat, native.from.lon),
        to: Coordinate::new(native.to.lat, native.to.lon),
        duration_seconds: native.duration,
        distance_meters: native.distance.map_or(0, metres),
        route_short_name: native.route_short_name,
        headsign: native.headsign,
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "distances are reported in whole metres, fractions are dropped"
)]
fn metres(distance: f64) -> i64 {
    distance as i64
}

fn location_type(raw: &str) -> Option<LocationType> {
    match raw {
        "STOP" => Some(LocationType::Stop),
        "PLACE" => Some(LocationType::Place),
        "ADDRESS" => Some(LocationType::Address),
        _ => None,
    }
}

fn location(native: Match) -> Location {
    Location {
        kind: native.kind.as_deref().and_then(location_type),
        name: native.name,
        place_id: native.id,
        pos: Coordinate::new(native.lat, native.lon),
        score: native.score,
        category: native.category,
        areas: native.areas.into_iter().map(area).collect(),
        tokens: native
            .tokens
            .iter()
            .filter_map(native::token_parts)
            .map(|(start, length)| Token { start, length })
            .collect(),
        modes: native.modes.map(|modes| {
            modes
                .iter()
                .map(|mode| native::mode_label(mode).to_owned())
                .collect()
        }),
        importance: native.importance,
        street: native.street,
        house_number: native.house_number,
        country: native.country,
        zip: native.zip,
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "administrative levels are small integers carried as JSON numbers"
)]
fn area(native: NativeArea) -> Area {
    Area {
        name: native.name,
        admin_level: native.admin_level as i64,
        matched: native.matched,
        unique: native.unique.unwrap_or(false),
        is_default: native.default.unwrap_or(false),
    }
}
