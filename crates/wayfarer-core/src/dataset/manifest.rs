//! The `config.yml` file at the root of a snapshot dataset.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

use crate::error::OpenError;

/// File name of the manifest inside a dataset directory.
pub const MANIFEST_FILE: &str = "config.yml";

/// Optional artefacts a snapshot dataset provides.
///
/// Relative paths are resolved against the dataset directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// JSON array of geocoder match records.
    #[serde(default)]
    pub places: Option<Utf8PathBuf>,
    /// Directory of pre-rendered `{z}/{x}/{y}.mvt` tiles.
    #[serde(default)]
    pub tiles: Option<Utf8PathBuf>,
    /// Directory of `<fontstack>/<range>.pbf` glyph ranges.
    #[serde(default)]
    pub glyphs: Option<Utf8PathBuf>,
}

impl Manifest {
    /// Reads the manifest of the dataset rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`OpenError::Read`] when the file cannot be read and
    /// [`OpenError::Manifest`] when it is not a valid manifest.
    pub fn read(root: &Utf8Path) -> Result<Self, OpenError> {
        let path = root.join(MANIFEST_FILE);
        let text = std::fs::read_to_string(&path).map_err(|source| OpenError::Read {
            path: path.clone(),
            source,
        })?;
        Self::parse(&text).map_err(|message| OpenError::manifest(path, message))
    }

    /// Parses manifest text. An empty document declares no artefacts.
    ///
    /// # Errors
    ///
    /// Returns the parser diagnostic when the text is not a valid manifest.
    pub fn parse(text: &str) -> Result<Self, String> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_saphyr::from_str(text).map_err(|error| error.to_string())
    }

    /// Resolves an artefact path against the dataset root.
    #[must_use]
    pub fn resolve(root: &Utf8Path, artefact: &Utf8Path) -> Utf8PathBuf {
        if artefact.is_absolute() {
            artefact.to_path_buf()
        } else {
            root.join(artefact)
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn parses_all_artefacts() {
        let manifest = Manifest::parse("places: places.json\ntiles: tiles\nglyphs: /srv/glyphs\n")
            .expect("parse manifest");
        assert_eq!(manifest.places.as_deref(), Some(Utf8Path::new("places.json")));
        assert_eq!(manifest.tiles.as_deref(), Some(Utf8Path::new("tiles")));
        assert_eq!(manifest.glyphs.as_deref(), Some(Utf8Path::new("/srv/glyphs")));
    }

    #[rstest]
    #[case::empty("")]
    #[case::whitespace("  \n")]
    fn blank_manifest_declares_nothing(#[case] text: &str) {
        assert_eq!(Manifest::parse(text).expect("parse manifest"), Manifest::default());
    }

    #[rstest]
    fn rejects_unknown_keys() {
        assert!(Manifest::parse("street_network: osm.pbf\n").is_err());
    }

    #[rstest]
    fn resolves_relative_paths_against_root() {
        let root = Utf8Path::new("/data/sweden");
        assert_eq!(
            Manifest::resolve(root, Utf8Path::new("tiles")),
            Utf8PathBuf::from("/data/sweden/tiles")
        );
        assert_eq!(
            Manifest::resolve(root, Utf8Path::new("/srv/glyphs")),
            Utf8PathBuf::from("/srv/glyphs")
        );
    }
}
