//! Itineraries and their legs as returned by route planning.

use serde::{Deserialize, Serialize};

use crate::Coordinate;

/// One itinerary returned by route planning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Total travel time in seconds.
    pub duration_seconds: i64,
    /// Number of vehicle changes.
    pub transfers: i64,
    /// Legs in travel order.
    pub legs: Vec<Leg>,
}

/// A single leg of an itinerary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    /// Transport mode label such as `WALK` or `BUS`.
    pub mode: String,
    /// Name of the departure place.
    pub from_name: String,
    /// Name of the arrival place.
    pub to_name: String,
    /// Departure position.
    pub from: Coordinate,
    /// Arrival position.
    pub to: Coordinate,
    /// Leg duration in seconds.
    pub duration_seconds: i64,
    /// Travelled distance in metres, `0` when the engine did not report one.
    pub distance_meters: i64,
    /// Public short name of the transit route.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_short_name: Option<String>,
    /// Vehicle headsign.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headsign: Option<String>,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn walk_leg() -> Leg {
        Leg {
            mode: String::from("WALK"),
            from_name: String::from("Start"),
            to_name: String::from("End"),
            from: Coordinate::new(59.33, 18.06),
            to: Coordinate::new(59.31, 18.07),
            duration_seconds: 300,
            distance_meters: 420,
            route_short_name: None,
            headsign: None,
        }
    }

    #[rstest]
    fn omits_absent_transit_fields() {
        let value = serde_json::to_value(walk_leg()).expect("serialize leg");
        assert_eq!(
            value,
            json!({
                "mode": "WALK",
                "from_name": "Start",
                "to_name": "End",
                "from": {"lat": 59.33, "lon": 18.06},
                "to": {"lat": 59.31, "lon": 18.07},
                "duration_seconds": 300,
                "distance_meters": 420
            })
        );
    }

    #[rstest]
    fn writes_transit_fields_when_present() {
        let leg = Leg {
            mode: String::from("BUS"),
            route_short_name: Some(String::from("4")),
            headsign: Some(String::from("Radiohuset")),
            ..walk_leg()
        };
        let value = serde_json::to_value(leg).expect("serialize leg");
        assert_eq!(value["route_short_name"], "4");
        assert_eq!(value["headsign"], "Radiohuset");
    }
}
