//! Canonical endpoint requests.
//!
//! Typed calls and raw `path?query` calls both end up as an [`ApiRequest`].
//! Typed calls are first rendered to the same text a host would send and then
//! parsed back, so the two entry points cannot drift apart.

use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use url::form_urlencoded;

use wayfarer_types::Coordinate;

use crate::error::GatewayError;

/// Bytes escaped in query values: everything except `[A-Za-z0-9-_.~]`.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Place values keep the `lat,lon` comma literal.
const PLACE_VALUE: &AsciiSet = &QUERY_VALUE.remove(b',');

/// Parameters whose values are `lat,lon` place values.
const PLACE_PARAMS: &[&str] = &["fromPlace", "toPlace", "place"];

/// Canonical planning path.
pub const PLAN_PATH: &str = "/api/v1/plan";
/// Canonical geocoding path.
pub const GEOCODE_PATH: &str = "/api/v1/geocode";
/// Canonical reverse geocoding path.
pub const REVERSE_GEOCODE_PATH: &str = "/api/v1/reverse-geocode";

const GLYPH_PREFIX: &str = "/tiles/glyphs/";
const LEGACY_DISPLAY_SUFFIX: &str = " Display";

/// A request addressed to an endpoint handler: a path plus decoded query
/// parameters in their original order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    path: String,
    params: Vec<(String, String)>,
}

impl ApiRequest {
    /// Starts a request for `path` with no parameters.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: Vec::new(),
        }
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Parses `path[?query][#fragment]`.
    ///
    /// Query values are percent-decoded. The fragment is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MalformedPath`] when the input is empty or the
    /// path is not absolute.
    pub fn parse(path_and_query: &str) -> Result<Self, GatewayError> {
        let trimmed = path_and_query.trim();
        let without_fragment = trimmed
            .split_once('#')
            .map_or(trimmed, |(before, _)| before);
        let (path, query) = without_fragment
            .split_once('?')
            .unwrap_or((without_fragment, ""));
        if path.is_empty() {
            return Err(GatewayError::malformed(path_and_query, "empty path"));
        }
        if !path.starts_with('/') {
            return Err(GatewayError::malformed(
                path_and_query,
                "path must start with '/'",
            ));
        }
        let params = form_urlencoded::parse(query.as_bytes())
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect();
        Ok(Self {
            path: path.to_owned(),
            params,
        })
    }

    /// Path component; the only part that takes part in routing.
    #[must_use]
    pub fn path(&self) -> &str {
        self.path.as_str()
    }

    /// Decoded query parameters in request order.
    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        self.params.as_slice()
    }

    /// First value of the named parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Display for ApiRequest {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.path)?;
        let mut separator = '?';
        for (name, value) in &self.params {
            let value_set = if PLACE_PARAMS.contains(&name.as_str()) {
                PLACE_VALUE
            } else {
                QUERY_VALUE
            };
            write!(
                formatter,
                "{separator}{}={}",
                utf8_percent_encode(name, QUERY_VALUE),
                utf8_percent_encode(value, value_set)
            )?;
            separator = '&';
        }
        Ok(())
    }
}

/// Arguments of an itinerary query.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteQuery {
    /// Origin.
    pub from: Coordinate,
    /// Destination.
    pub to: Coordinate,
    /// Departure time as understood by the engine (ISO 8601).
    pub departure_time: Option<String>,
    /// Upper bound on the number of itineraries the engine should compute.
    pub max_itineraries: Option<u32>,
}

impl RouteQuery {
    /// Query between two coordinates departing now.
    #[must_use]
    pub fn between(from: Coordinate, to: Coordinate) -> Self {
        Self {
            from,
            to,
            departure_time: None,
            max_itineraries: None,
        }
    }
}

/// Renders a coordinate as an engine place value (`lat,lon`).
#[must_use]
pub fn place_value(pos: Coordinate) -> String {
    format!("{},{}", pos.lat, pos.lon)
}

/// Canonical request text for itinerary planning.
#[must_use]
pub fn plan(query: &RouteQuery) -> String {
    let mut request = ApiRequest::new(PLAN_PATH)
        .with_param("fromPlace", place_value(query.from))
        .with_param("toPlace", place_value(query.to));
    if let Some(time) = &query.departure_time {
        request = request.with_param("time", time.as_str());
    }
    if let Some(limit) = query.max_itineraries {
        request = request.with_param("numItineraries", limit.to_string());
    }
    request.to_string()
}

/// Canonical request text for forward geocoding.
#[must_use]
pub fn geocode(text: &str) -> String {
    ApiRequest::new(GEOCODE_PATH)
        .with_param("text", text)
        .to_string()
}

/// Canonical request text for reverse geocoding.
#[must_use]
pub fn reverse_geocode(pos: Coordinate) -> String {
    ApiRequest::new(REVERSE_GEOCODE_PATH)
        .with_param("place", place_value(pos))
        .to_string()
}

/// Maps a style glyph URL path to a glyph resource name.
///
/// The path is percent-decoded and must start with `/tiles/glyphs/`. The
/// first ` Display` in the remainder is dropped so styles that still name the
/// legacy display font resolve to the regular face.
#[must_use]
pub fn glyph_resource(path: &str) -> Option<String> {
    let decoded = percent_decode_str(path).decode_utf8().ok()?;
    let resource = decoded
        .strip_prefix(GLYPH_PREFIX)?
        .replacen(LEGACY_DISPLAY_SUFFIX, "", 1);
    (!resource.is_empty()).then_some(resource)
}
