//! Geocoding results: places, their administrative areas and matched tokens.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Coordinate;

/// Kind of place a location result refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationType {
    /// A public transport stop or station.
    Stop,
    /// A named place or point of interest.
    Place,
    /// A street address.
    Address,
}

impl LocationType {
    /// Returns the protocol label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stop => "STOP",
            Self::Place => "PLACE",
            Self::Address => "ADDRESS",
        }
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A geocoding or reverse-geocoding result.
///
/// On the wire the position is flattened into top-level `lat` and `lon`
/// fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Display name.
    pub name: String,
    /// Engine identifier of the place.
    pub place_id: String,
    /// Position of the place.
    #[serde(flatten)]
    pub pos: Coordinate,
    /// Relevance score assigned by the geocoder.
    pub score: f64,
    /// Location kind. Always present for reverse-geocode results.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<LocationType>,
    /// Point-of-interest category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Administrative areas containing the place, innermost first.
    #[serde(default)]
    pub areas: Vec<Area>,
    /// Spans of the name matched by the query.
    #[serde(default)]
    pub tokens: Vec<Token>,
    /// Transport modes serving a stop.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modes: Option<Vec<String>>,
    /// Stop importance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<f64>,
    /// Street of an address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    /// House number of an address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house_number: Option<String>,
    /// Country code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Postal code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
}

/// Administrative area attached to a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    /// Area name.
    pub name: String,
    /// OpenStreetMap administrative level.
    pub admin_level: i64,
    /// Whether the query matched this area.
    pub matched: bool,
    /// Whether the area name is unique among the candidates.
    #[serde(default)]
    pub unique: bool,
    /// Whether this is the area shown by default.
    #[serde(rename = "default", default)]
    pub is_default: bool,
}

/// Matched span within a location name, written as `[start, length]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct Token {
    /// Offset of the first matched character.
    pub start: u32,
    /// Number of matched characters.
    pub length: u32,
}

impl From<[u32; 2]> for Token {
    fn from([start, length]: [u32; 2]) -> Self {
        Self { start, length }
    }
}

impl From<Token> for [u32; 2] {
    fn from(token: Token) -> Self {
        [token.start, token.length]
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn central() -> Location {
        Location {
            name: String::from("Stockholm Central"),
            place_id: String::from("sweden_740000001"),
            pos: Coordinate::new(59.3302, 18.0581),
            score: 12.5,
            kind: Some(LocationType::Stop),
            category: None,
            areas: vec![Area {
                name: String::from("Stockholm"),
                admin_level: 7,
                matched: false,
                unique: false,
                is_default: true,
            }],
            tokens: vec![Token {
                start: 0,
                length: 9,
            }],
            modes: Some(vec![String::from("RAIL")]),
            importance: None,
            street: None,
            house_number: None,
            country: None,
            zip: None,
        }
    }

    #[rstest]
    fn flattens_position_and_spells_default() {
        let value = serde_json::to_value(central()).expect("serialize location");
        assert_eq!(value["lat"], 59.3302);
        assert_eq!(value["lon"], 18.0581);
        assert_eq!(value["type"], "STOP");
        assert_eq!(value["tokens"], json!([[0, 9]]));
        assert_eq!(value["areas"][0]["default"], true);
        assert!(value.get("pos").is_none());
        assert!(value.get("importance").is_none());
    }

    #[rstest]
    fn reads_back_its_own_wire_form() {
        let text = serde_json::to_string(&central()).expect("serialize location");
        let parsed: Location = serde_json::from_str(&text).expect("parse location");
        assert_eq!(parsed, central());
    }
}
