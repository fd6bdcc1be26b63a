//! Path dispatch table.
//!
//! Each endpoint is described once by a [`RouteEntry`]: the paths it answers
//! to (one per API version) and the subsystems its handler needs. The table
//! is built once per instance and only ever read afterwards.

use std::collections::HashMap;

use thiserror::Error;

use crate::engine::Endpoint;
use crate::subsystem::Subsystem;

/// Subsystems required to serve vector tiles.
pub const TILE_REQUIREMENTS: &[Subsystem] = &[Subsystem::TileStore];

/// Subsystems required to serve glyph ranges.
pub const GLYPH_REQUIREMENTS: &[Subsystem] = &[Subsystem::GlyphStore];

/// Static description of one routable endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteEntry {
    /// Handler the paths dispatch to.
    pub endpoint: Endpoint,
    /// Request paths accepted for this endpoint.
    pub aliases: &'static [&'static str],
    /// Subsystems that must be loaded before the handler runs.
    pub required: &'static [Subsystem],
}

impl RouteEntry {
    const fn new(
        endpoint: Endpoint,
        aliases: &'static [&'static str],
        required: &'static [Subsystem],
    ) -> Self {
        Self {
            endpoint,
            aliases,
            required,
        }
    }
}

/// Routes served by the gateway.
pub const STANDARD_ROUTES: &[RouteEntry] = &[
    RouteEntry::new(
        Endpoint::Plan,
        &["/api/v1/plan", "/api/v5/plan"],
        &[
            Subsystem::StreetNetwork,
            Subsystem::Timetable,
            Subsystem::PlaceMatches,
        ],
    ),
    RouteEntry::new(
        Endpoint::Geocode,
        &["/api/v1/geocode", "/api/v5/geocode"],
        &[
            Subsystem::GeocodeText,
            Subsystem::GeocodeFuzzy,
            Subsystem::GeocodeCategories,
        ],
    ),
    RouteEntry::new(
        Endpoint::ReverseGeocode,
        &["/api/v1/reverse-geocode", "/api/v5/reverse-geocode"],
        &[
            Subsystem::ReverseIndex,
            Subsystem::GeocodeText,
            Subsystem::GeocodeFuzzy,
            Subsystem::StreetNetwork,
        ],
    ),
    RouteEntry::new(
        Endpoint::MapInitial,
        &["/api/v1/map/initial"],
        &[Subsystem::Timetable],
    ),
    RouteEntry::new(
        Endpoint::MapLevels,
        &["/api/v1/map/levels"],
        &[Subsystem::StreetNetwork, Subsystem::NetworkLookup],
    ),
    RouteEntry::new(
        Endpoint::StopTimes,
        &["/api/v1/stoptimes", "/api/v4/stoptimes", "/api/v5/stoptimes"],
        &[
            Subsystem::LocationIndex,
            Subsystem::Timetable,
            Subsystem::Tags,
        ],
    ),
    RouteEntry::new(
        Endpoint::Trip,
        &["/api/v1/trip", "/api/v5/trip"],
        &[
            Subsystem::LocationIndex,
            Subsystem::Timetable,
            Subsystem::Tags,
        ],
    ),
    RouteEntry::new(
        Endpoint::MapTrips,
        &["/api/v1/map/trips", "/api/v4/map/trips", "/api/v5/map/trips"],
        &[Subsystem::Timetable, Subsystem::Tags, Subsystem::TripIndex],
    ),
    RouteEntry::new(
        Endpoint::MapStops,
        &["/api/v1/map/stops"],
        &[
            Subsystem::LocationIndex,
            Subsystem::Timetable,
            Subsystem::Tags,
        ],
    ),
    RouteEntry::new(
        Endpoint::Rentals,
        &["/api/v1/rentals", "/api/v1/map/rentals"],
        &[Subsystem::RentalFeed],
    ),
    RouteEntry::new(
        Endpoint::OneToAll,
        &["/api/v1/one-to-all", "/api/experimental/one-to-all"],
        &[Subsystem::Timetable, Subsystem::Tags],
    ),
    RouteEntry::new(
        Endpoint::OneToMany,
        &["/api/v1/one-to-many"],
        &[Subsystem::StreetNetwork, Subsystem::NetworkLookup],
    ),
];

/// Errors raised while building a route table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteTableError {
    /// Two entries claim the same path.
    #[error("path '{path}' is claimed by both {first} and {second}")]
    DuplicateAlias {
        /// Contested path.
        path: &'static str,
        /// Endpoint that registered the path first.
        first: Endpoint,
        /// Endpoint that tried to register it again.
        second: Endpoint,
    },
    /// An entry lists no paths at all.
    #[error("{endpoint} has no paths")]
    NoAliases {
        /// Offending endpoint.
        endpoint: Endpoint,
    },
}

/// Immutable map from request path to route entry.
#[derive(Debug, Clone)]
pub struct RouteTable {
    by_path: HashMap<&'static str, RouteEntry>,
}

impl RouteTable {
    /// Builds the table for [`STANDARD_ROUTES`].
    ///
    /// # Errors
    ///
    /// Returns a [`RouteTableError`] if the standard routes are inconsistent.
    pub fn standard() -> Result<Self, RouteTableError> {
        Self::from_routes(STANDARD_ROUTES)
    }

    /// Builds a table from arbitrary entries.
    ///
    /// # Errors
    ///
    /// Returns [`RouteTableError::DuplicateAlias`] when two entries share a
    /// path and [`RouteTableError::NoAliases`] when an entry has no paths.
    pub fn from_routes(routes: &[RouteEntry]) -> Result<Self, RouteTableError> {
        let mut by_path = HashMap::new();
        for route in routes {
            if route.aliases.is_empty() {
                return Err(RouteTableError::NoAliases {
                    endpoint: route.endpoint,
                });
            }
            for &path in route.aliases {
                if let Some(existing) = by_path.insert(path, *route) {
                    return Err(RouteTableError::DuplicateAlias {
                        path,
                        first: existing.endpoint,
                        second: route.endpoint,
                    });
                }
            }
        }
        Ok(Self { by_path })
    }

    /// Looks up the entry for an exact request path.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<&RouteEntry> {
        self.by_path.get(path)
    }

    /// Number of routable paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    /// Whether the table routes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use strum::IntoEnumIterator;

    use super::*;

    #[fixture]
    fn table() -> RouteTable {
        RouteTable::standard().expect("standard routes are consistent")
    }

    #[rstest]
    #[case("/api/v1/plan", Endpoint::Plan)]
    #[case("/api/v5/plan", Endpoint::Plan)]
    #[case("/api/v4/stoptimes", Endpoint::StopTimes)]
    #[case("/api/v5/map/trips", Endpoint::MapTrips)]
    #[case("/api/v1/map/rentals", Endpoint::Rentals)]
    #[case("/api/experimental/one-to-all", Endpoint::OneToAll)]
    fn resolves_versioned_aliases(table: RouteTable, #[case] path: &str, #[case] endpoint: Endpoint) {
        let route = table.resolve(path).expect("path should be routed");
        assert_eq!(route.endpoint, endpoint);
    }

    #[rstest]
    #[case::unknown("/api/v1/nope")]
    #[case::trailing_slash("/api/v1/plan/")]
    #[case::case_sensitive("/API/v1/plan")]
    #[case::unlisted_version("/api/v4/plan")]
    fn rejects_anything_but_exact_paths(table: RouteTable, #[case] path: &str) {
        assert!(table.resolve(path).is_none());
    }

    #[rstest]
    fn every_endpoint_is_routed_once() {
        for endpoint in Endpoint::iter() {
            let count = STANDARD_ROUTES
                .iter()
                .filter(|route| route.endpoint == endpoint)
                .count();
            assert_eq!(count, 1, "{endpoint} should have exactly one entry");
        }
    }

    #[rstest]
    fn plan_needs_network_timetable_and_matches(table: RouteTable) {
        let route = table.resolve("/api/v1/plan").expect("plan route");
        assert_eq!(
            route.required,
            &[
                Subsystem::StreetNetwork,
                Subsystem::Timetable,
                Subsystem::PlaceMatches
            ]
        );
    }

    #[rstest]
    fn reverse_geocode_needs_street_network(table: RouteTable) {
        let route = table
            .resolve("/api/v1/reverse-geocode")
            .expect("reverse route");
        assert!(route.required.contains(&Subsystem::StreetNetwork));
        assert!(!route.required.contains(&Subsystem::GeocodeCategories));
    }

    #[rstest]
    fn duplicate_alias_is_rejected() {
        let routes = [
            RouteEntry::new(Endpoint::Trip, &["/api/v1/trip"], &[]),
            RouteEntry::new(Endpoint::StopTimes, &["/api/v1/trip"], &[]),
        ];
        assert_eq!(
            RouteTable::from_routes(&routes).expect_err("duplicate should fail"),
            RouteTableError::DuplicateAlias {
                path: "/api/v1/trip",
                first: Endpoint::Trip,
                second: Endpoint::StopTimes,
            }
        );
    }

    #[rstest]
    fn entry_without_paths_is_rejected() {
        let routes = [RouteEntry::new(Endpoint::Rentals, &[], &[])];
        assert!(matches!(
            RouteTable::from_routes(&routes),
            Err(RouteTableError::NoAliases { .. })
        ));
    }
}
