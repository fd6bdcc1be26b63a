//! Response records as the engine's handlers emit them.
//!
//! These mirror the engine's JSON closely and are never exposed outside the
//! crate. Optional attributes stay optional here; defaults are applied by the
//! projector only where the external model demands one.

use serde::Deserialize;
use serde_json::Value;

/// Body of a plan response. Fields other than the itineraries are ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct PlanResponse {
    #[serde(default)]
    pub(crate) itineraries: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Itinerary {
    pub(crate) duration: i64,
    pub(crate) transfers: i64,
    #[serde(default)]
    pub(crate) legs: Vec<NativeLeg>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NativeLeg {
    pub(crate) mode: String,
    pub(crate) from: NativePlace,
    pub(crate) to: NativePlace,
    pub(crate) duration: i64,
    pub(crate) distance: Option<f64>,
    pub(crate) route_short_name: Option<String>,
    pub(crate) headsign: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NativePlace {
    pub(crate) name: String,
    pub(crate) lat: f64,
    pub(crate) lon: f64,
}

/// A geocoder match.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Match {
    #[serde(rename = "type")]
    pub(crate) kind: Option<String>,
    pub(crate) name: String,
    pub(crate) id: String,
    pub(crate) lat: f64,
    pub(crate) lon: f64,
    pub(crate) score: f64,
    pub(crate) category: Option<String>,
    #[serde(default)]
    pub(crate) areas: Vec<NativeArea>,
    #[serde(default)]
    pub(crate) tokens: Vec<Value>,
    pub(crate) modes: Option<Vec<String>>,
    pub(crate) importance: Option<f64>,
    pub(crate) street: Option<String>,
    pub(crate) house_number: Option<String>,
    pub(crate) country: Option<String>,
    pub(crate) zip: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NativeArea {
    pub(crate) name: String,
    pub(crate) admin_level: f64,
    pub(crate) matched: bool,
    pub(crate) unique: Option<bool>,
    pub(crate) default: Option<bool>,
}

/// Label written for modes missing from [`mode_label`]'s table.
pub(crate) const UNKNOWN_MODE: &str = "UNKNOWN";

/// Maps an engine mode name to its external label.
pub(crate) fn mode_label(raw: &str) -> &'static str {
    match raw {
        "WALK" => "WALK",
        "BIKE" => "BIKE",
        "RENTAL" => "RENTAL",
        "CAR" => "CAR",
        "CAR_PARKING" => "CAR_PARKING",
        "CAR_DROPOFF" => "CAR_DROPOFF",
        "ODM" => "ODM",
        "FLEX" => "FLEX",
        "RIDE_SHARING" => "RIDE_SHARING",
        "TRANSIT" => "TRANSIT",
        "TRAM" => "TRAM",
        "SUBWAY" => "SUBWAY",
        "FERRY" => "FERRY",
        "AIRPLANE" => "AIRPLANE",
        "SUBURBAN" => "SUBURBAN",
        "BUS" => "BUS",
        "COACH" => "COACH",
        "RAIL" => "RAIL",
        "HIGHSPEED_RAIL" => "HIGHSPEED_RAIL",
        "LONG_DISTANCE" => "LONG_DISTANCE",
        "NIGHT_RAIL" => "NIGHT_RAIL",
        "REGIONAL_FAST_RAIL" => "REGIONAL_FAST_RAIL",
        "REGIONAL_RAIL" => "REGIONAL_RAIL",
        "CABLE_CAR" => "CABLE_CAR",
        "FUNICULAR" => "FUNICULAR",
        "AREAL_LIFT" => "AREAL_LIFT",
        "METRO" => "METRO",
        "OTHER" => "OTHER",
        _ => UNKNOWN_MODE,
    }
}

/// Reads a `[start, length, ...]` token; anything shorter, negative,
/// fractional or out of range yields `None`.
pub(crate) fn token_parts(raw: &Value) -> Option<(u32, u32)> {
    let parts = raw.as_array()?;
    let component = |index: usize| parts.get(index).and_then(token_component);
    Some((component(0)?, component(1)?))
}

/// Engines write token components as integers or as whole doubles.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "the cast only runs on whole numbers already checked to fit in u32"
)]
fn token_component(value: &Value) -> Option<u32> {
    if let Some(whole) = value.as_u64() {
        return u32::try_from(whole).ok();
    }
    let number = value.as_f64()?;
    let whole =
        (0.0..=f64::from(u32::MAX)).contains(&number) && number.fract().abs() < f64::EPSILON;
    whole.then(|| number as u32)
}
