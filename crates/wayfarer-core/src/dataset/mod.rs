//! File-backed snapshot datasets.
//!
//! A snapshot dataset is a directory holding a `config.yml` manifest and any
//! of three optional artefacts: a place snapshot, a tile tree and a glyph
//! tree. It implements the engine seam well enough to serve geocoding, tiles
//! and glyphs without the full routing engine. Routing and timetable
//! endpoints always report their subsystems as missing.

mod manifest;
mod places;

use std::io;
use std::sync::Arc;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use tracing::debug;

pub use self::manifest::{MANIFEST_FILE, Manifest};
pub use self::places::PlaceIndex;

use crate::engine::{Endpoint, Engine, EngineLoader, HandlerFault, TileCoord};
use crate::error::OpenError;
use crate::request::ApiRequest;
use crate::subsystem::{Subsystem, Subsystems};

const DATASET_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dataset");

/// Subsystems a place snapshot provides.
///
/// The snapshot's coordinate index stands in for the street network when
/// snapping reverse lookups to the nearest place.
const PLACE_SUBSYSTEMS: &[Subsystem] = &[
    Subsystem::GeocodeText,
    Subsystem::GeocodeFuzzy,
    Subsystem::GeocodeCategories,
    Subsystem::ReverseIndex,
    Subsystem::StreetNetwork,
];

/// Loads snapshot datasets from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotLoader;

impl EngineLoader for SnapshotLoader {
    fn load(&self, path: &Utf8Path) -> Result<Arc<dyn Engine>, OpenError> {
        Ok(Arc::new(SnapshotEngine::open(path)?))
    }
}

/// Engine backed by a snapshot dataset directory.
#[derive(Debug)]
pub struct SnapshotEngine {
    subsystems: Subsystems,
    places: Option<PlaceIndex>,
    tiles: Option<Utf8PathBuf>,
    glyphs: Option<Utf8PathBuf>,
}

impl SnapshotEngine {
    /// Opens the dataset rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`OpenError::MissingDataset`] when `root` is not a directory,
    /// and a manifest or artefact error when a declared artefact is missing or
    /// malformed.
    pub fn open(root: &Utf8Path) -> Result<Self, OpenError> {
        if !root.is_dir() {
            return Err(OpenError::MissingDataset {
                path: root.to_path_buf(),
            });
        }
        let manifest = Manifest::read(root)?;
        let places = manifest
            .places
            .as_deref()
            .map(|path| PlaceIndex::load(&Manifest::resolve(root, path)))
            .transpose()?;
        let tiles = manifest
            .tiles
            .as_deref()
            .map(|path| artefact_dir(root, path))
            .transpose()?;
        let glyphs = manifest
            .glyphs
            .as_deref()
            .map(|path| artefact_dir(root, path))
            .transpose()?;

        let mut subsystems = Subsystems::empty();
        if places.is_some() {
            subsystems = PLACE_SUBSYSTEMS
                .iter()
                .fold(subsystems, |set, subsystem| set.with(*subsystem));
        }
        if tiles.is_some() {
            subsystems = subsystems.with(Subsystem::TileStore);
        }
        if glyphs.is_some() {
            subsystems = subsystems.with(Subsystem::GlyphStore);
        }
        debug!(
            target: DATASET_TARGET,
            dataset = %root,
            places = places.as_ref().map_or(0, PlaceIndex::len),
            %subsystems,
            "snapshot dataset loaded"
        );
        Ok(Self {
            subsystems,
            places,
            tiles,
            glyphs,
        })
    }

    fn places(&self) -> Result<&PlaceIndex, HandlerFault> {
        self.places
            .as_ref()
            .ok_or_else(|| HandlerFault::new("dataset has no place snapshot"))
    }
}

impl Engine for SnapshotEngine {
    fn subsystems(&self) -> Subsystems {
        self.subsystems
    }

    fn serve(&self, endpoint: Endpoint, request: &ApiRequest) -> Result<String, HandlerFault> {
        let matches = match endpoint {
            Endpoint::Geocode => {
                let text = request
                    .param("text")
                    .ok_or_else(|| HandlerFault::new("missing parameter 'text'"))?;
                self.places()?.search(text)
            }
            Endpoint::ReverseGeocode => {
                let place = request
                    .param("place")
                    .ok_or_else(|| HandlerFault::new("missing parameter 'place'"))?;
                self.places()?.nearest(place)?
            }
            other => {
                return Err(HandlerFault::new(format!(
                    "{other} is not served by snapshot datasets"
                )));
            }
        };
        serde_json::to_string(&matches)
            .map_err(|error| HandlerFault::with_source("failed to encode matches", error))
    }

    fn tile(&self, tile: TileCoord) -> Result<Option<Vec<u8>>, HandlerFault> {
        let Some(root) = &self.tiles else {
            return Ok(None);
        };
        let path = root
            .join(tile.z.to_string())
            .join(tile.x.to_string())
            .join(format!("{}.mvt", tile.y));
        read_optional(&path)
    }

    fn glyph(&self, resource: &str) -> Result<Option<Vec<u8>>, HandlerFault> {
        let Some(root) = &self.glyphs else {
            return Ok(None);
        };
        let relative = Utf8Path::new(resource);
        let contained = relative
            .components()
            .all(|component| matches!(component, Utf8Component::Normal(_)));
        if !contained {
            debug!(target: DATASET_TARGET, resource, "glyph path escapes the glyph store");
            return Ok(None);
        }
        read_optional(&root.join(relative))
    }
}

fn artefact_dir(root: &Utf8Path, path: &Utf8Path) -> Result<Utf8PathBuf, OpenError> {
    let resolved = Manifest::resolve(root, path);
    if resolved.is_dir() {
        Ok(resolved)
    } else {
        Err(OpenError::artefact(resolved, "not a directory"))
    }
}

fn read_optional(path: &Utf8Path) -> Result<Option<Vec<u8>>, HandlerFault> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(error) => Err(HandlerFault::with_source(
            format!("failed to read '{path}'"),
            error,
        )),
    }
}
