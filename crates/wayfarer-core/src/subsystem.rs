//! Independently loadable engine capabilities.
//!
//! A dataset may be built with only part of the engine's data: a street
//! network without timetables, geocoding indices without tiles, and so on.
//! Each such piece is a [`Subsystem`]; the set an engine actually loaded is a
//! [`Subsystems`] value that the capability gate consults before every call.

use std::fmt;

use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// A data subsystem an endpoint handler may depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Subsystem {
    /// Street network graph used for walking, cycling and driving.
    StreetNetwork,
    /// Lookup structures derived from the street network.
    NetworkLookup,
    /// Platform and indoor level data.
    Platforms,
    /// Elevation profiles.
    Elevations,
    /// Static timetable.
    Timetable,
    /// Timetable tags mapping identifiers to feeds.
    Tags,
    /// Matches between timetable stops and street network nodes.
    PlaceMatches,
    /// Spatial index over timetable locations.
    LocationIndex,
    /// Timezone lookup.
    Timezones,
    /// Precomputed trip index used for map trip rendering.
    TripIndex,
    /// Trip shape geometries.
    Shapes,
    /// Geocoder text index.
    GeocodeText,
    /// Geocoder fuzzy token index.
    GeocodeFuzzy,
    /// Geocoder category index.
    GeocodeCategories,
    /// Reverse geocoding index.
    ReverseIndex,
    /// Vector tile store.
    TileStore,
    /// Glyph (font) store.
    GlyphStore,
    /// Shared mobility (rental) feeds.
    RentalFeed,
    /// Realtime updates.
    Realtime,
    /// On-demand service areas.
    FlexAreas,
}

impl Subsystem {
    const fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

/// Set of loaded subsystems.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Subsystems(u32);

impl Subsystems {
    /// A set with no subsystems loaded.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Builds a set from the supplied subsystems.
    #[must_use]
    pub fn of(subsystems: &[Subsystem]) -> Self {
        subsystems
            .iter()
            .fold(Self::empty(), |set, subsystem| set.with(*subsystem))
    }

    /// Returns a copy of the set that also contains `subsystem`.
    #[must_use]
    pub const fn with(self, subsystem: Subsystem) -> Self {
        Self(self.0 | subsystem.bit())
    }

    /// Whether `subsystem` is loaded.
    #[must_use]
    pub const fn contains(self, subsystem: Subsystem) -> bool {
        self.0 & subsystem.bit() != 0
    }

    /// Whether no subsystem is loaded.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates over the loaded subsystems in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Subsystem> {
        Subsystem::iter().filter(move |subsystem| self.contains(*subsystem))
    }
}

impl FromIterator<Subsystem> for Subsystems {
    fn from_iter<I: IntoIterator<Item = Subsystem>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

impl fmt::Debug for Subsystems {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for Subsystems {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for subsystem in self.iter() {
            if !first {
                formatter.write_str(", ")?;
            }
            write!(formatter, "{subsystem}")?;
            first = false;
        }
        Ok(())
    }
}
