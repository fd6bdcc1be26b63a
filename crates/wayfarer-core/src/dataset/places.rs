//! Place snapshot serving geocode and reverse geocode requests.
//!
//! The snapshot is a JSON array of geocoder match records in the engine's
//! own format. Records are answered back verbatim apart from `score` and
//! `tokens`, which are recomputed for each query.

use camino::Utf8Path;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::engine::HandlerFault;
use crate::error::OpenError;
use crate::native::Match;

/// Maximum number of candidates a reverse lookup returns.
const REVERSE_CANDIDATES: usize = 10;

const EXACT_SCORE: f64 = 3.0;
const PREFIX_SCORE: f64 = 2.0;
const CONTAINS_SCORE: f64 = 1.0;

/// A case-folded name that remembers which original character each folded
/// character came from.
#[derive(Debug)]
struct Folded {
    text: String,
    origins: Vec<usize>,
}

impl Folded {
    fn new(name: &str) -> Self {
        let mut text = String::with_capacity(name.len());
        let mut origins = Vec::with_capacity(name.len());
        for (index, character) in name.chars().enumerate() {
            for lower in character.to_lowercase() {
                text.push(lower);
                origins.push(index);
            }
        }
        Self { text, origins }
    }

    /// Maps a folded match at byte `offset` spanning `chars` folded
    /// characters back to an original `(start, length)` in characters.
    fn original_span(&self, offset: usize, chars: usize) -> Option<(usize, usize)> {
        let first = self
            .text
            .char_indices()
            .take_while(|(index, _)| *index < offset)
            .count();
        let start = *self.origins.get(first)?;
        let last = *self.origins.get(first.checked_add(chars)?.checked_sub(1)?)?;
        Some((start, last.checked_sub(start)?.checked_add(1)?))
    }
}

#[derive(Debug)]
struct Entry {
    name: Folded,
    lat: f64,
    lon: f64,
    record: Map<String, Value>,
}

/// In-memory place index.
#[derive(Debug, Default)]
pub struct PlaceIndex {
    entries: Vec<Entry>,
}

impl PlaceIndex {
    /// Loads and validates a place snapshot file.
    ///
    /// # Errors
    ///
    /// Returns [`OpenError::Read`] when the file cannot be read and
    /// [`OpenError::Artefact`] when any record is not a valid match.
    pub fn load(path: &Utf8Path) -> Result<Self, OpenError> {
        let text = std::fs::read_to_string(path).map_err(|source| OpenError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|message| OpenError::artefact(path, message))
    }

    /// Builds an index from snapshot text.
    ///
    /// # Errors
    ///
    /// Returns a diagnostic naming the first invalid record.
    pub fn from_json(text: &str) -> Result<Self, String> {
        let records: Vec<Map<String, Value>> =
            serde_json::from_str(text).map_err(|error| error.to_string())?;
        let entries = records
            .into_iter()
            .enumerate()
            .map(|(position, record)| {
                let mut scored = record.clone();
                scored.insert(String::from("score"), json!(0.0));
                scored.insert(String::from("tokens"), json!([]));
                let parsed = Match::deserialize(&Value::Object(scored))
                    .map_err(|error| format!("record {position}: {error}"))?;
                Ok(Entry {
                    name: Folded::new(&parsed.name),
                    lat: parsed.lat,
                    lon: parsed.lon,
                    record,
                })
            })
            .collect::<Result<_, String>>()?;
        Ok(Self { entries })
    }

    /// Number of places in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the snapshot holds no places.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns matches whose name contains `text`, best first.
    ///
    /// Matching ignores case. Exact names rank above prefixes, prefixes above
    /// other substrings; ties keep snapshot order.
    #[must_use]
    pub fn search(&self, text: &str) -> Vec<Value> {
        let needle = Folded::new(text.trim()).text;
        if needle.is_empty() {
            return Vec::new();
        }
        let needle_chars = needle.chars().count();
        let mut hits: Vec<(f64, Value)> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let offset = entry.name.text.find(&needle)?;
                let span = entry.name.original_span(offset, needle_chars)?;
                let score = if entry.name.text == needle {
                    EXACT_SCORE
                } else if offset == 0 {
                    PREFIX_SCORE
                } else {
                    CONTAINS_SCORE
                };
                Some((score, respond(entry, score, &[span])))
            })
            .collect();
        hits.sort_by(|left, right| right.0.total_cmp(&left.0));
        hits.into_iter().map(|(_, record)| record).collect()
    }

    /// Returns the places nearest to a `lat,lon` place value, nearest first.
    ///
    /// # Errors
    ///
    /// Returns a [`HandlerFault`] when `place` is not a `lat,lon` pair.
    pub fn nearest(&self, place: &str) -> Result<Vec<Value>, HandlerFault> {
        let (lat, lon) = parse_place(place)
            .ok_or_else(|| HandlerFault::new(format!("invalid place '{place}'")))?;
        let mut ranked: Vec<(f64, &Entry)> = self
            .entries
            .iter()
            .map(|entry| (planar_distance(lat, lon, entry.lat, entry.lon), entry))
            .collect();
        ranked.sort_by(|left, right| left.0.total_cmp(&right.0));
        Ok(ranked
            .into_iter()
            .take(REVERSE_CANDIDATES)
            .map(|(_, entry)| respond(entry, 0.0, &[]))
            .collect())
    }
}

fn respond(entry: &Entry, score: f64, tokens: &[(usize, usize)]) -> Value {
    let mut record = entry.record.clone();
    record.insert(String::from("score"), json!(score));
    let tokens: Vec<Value> = tokens
        .iter()
        .map(|(start, length)| json!([start, length]))
        .collect();
    record.insert(String::from("tokens"), Value::Array(tokens));
    Value::Object(record)
}

fn parse_place(place: &str) -> Option<(f64, f64)> {
    let (lat, lon) = place.split_once(',')?;
    Some((lat.trim().parse().ok()?, lon.trim().parse().ok()?))
}

/// Squared equirectangular distance in degrees; only used for ranking.
#[expect(
    clippy::float_arithmetic,
    reason = "ranking candidates by distance is inherently floating point"
)]
fn planar_distance(lat: f64, lon: f64, other_lat: f64, other_lon: f64) -> f64 {
    let mean_lat = ((lat + other_lat) / 2.0).to_radians();
    let dx = (other_lon - lon) * mean_lat.cos();
    let dy = other_lat - lat;
    dx * dx + dy * dy
}
