//! Opening and serving file-backed snapshot datasets.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use rstest::{fixture, rstest};
use tempfile::TempDir;

use wayfarer_core::{OpenError, Subsystem};
use wayfarer_types::{Coordinate, LocationType};

const PLACES: &str = r#"[
    {
        "type": "PLACE",
        "name": "Centralbadet",
        "id": "osm_n_1",
        "lat": 59.3366,
        "lon": 18.0614,
        "category": "swimming_pool",
        "areas": [{"name": "Stockholm", "adminLevel": 7.0, "matched": false, "default": true}]
    },
    {
        "type": "STOP",
        "name": "Stockholm Central",
        "id": "740000001",
        "lat": 59.3302,
        "lon": 18.0581,
        "modes": ["RAIL", "SUBWAY", "BUS"],
        "importance": 0.98,
        "areas": [
            {"name": "Stockholm", "adminLevel": 7.0, "matched": true, "default": true},
            {"name": "Sverige", "adminLevel": 2.0, "matched": false}
        ]
    },
    {
        "type": "ADDRESS",
        "name": "Vasagatan 1",
        "id": "osm_a_7",
        "lat": 59.3310,
        "lon": 18.0590,
        "street": "Vasagatan",
        "houseNumber": "1",
        "zip": "111 20",
        "country": "SE"
    }
]"#;

struct Dataset {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Dataset {
    fn new(manifest: &str) -> Self {
        let dir = TempDir::new().expect("create dataset dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp path");
        fs::write(root.join("config.yml"), manifest).expect("write manifest");
        Self { _dir: dir, root }
    }

    fn write(&self, relative: &str, contents: &[u8]) {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create artefact dir");
        }
        fs::write(path, contents).expect("write artefact");
    }

    fn root(&self) -> &Utf8Path {
        &self.root
    }
}

#[fixture]
fn full() -> Dataset {
    let dataset = Dataset::new("places: places.json\ntiles: tiles\nglyphs: glyphs\n");
    dataset.write("places.json", PLACES.as_bytes());
    dataset.write("tiles/0/0/0.mvt", &[0x1a, 0x00, 0x7f]);
    dataset.write("glyphs/Noto Sans Regular/0-255.pbf", b"glyphs");
    dataset
}

#[fixture]
fn places_only() -> Dataset {
    let dataset = Dataset::new("places: places.json\n");
    dataset.write("places.json", PLACES.as_bytes());
    dataset
}

#[rstest]
fn geocoding_stockholm_central_finds_the_stop(full: Dataset) {
    let instance = wayfarer_core::open(full.root()).expect("open dataset");
    let results = instance.geocode("Stockholm Central");
    let first = results.first().expect("at least one result");
    assert_eq!(first.kind, Some(LocationType::Stop));
    assert!((59.0..=60.0).contains(&first.pos.lat));
    assert!((17.5..=19.0).contains(&first.pos.lon));
    assert_eq!(first.modes.as_deref().map(<[String]>::len), Some(3));
    assert_eq!(first.tokens.first().map(|token| token.length), Some(17));
}

#[rstest]
fn geocode_preserves_optional_address_fields(full: Dataset) {
    let instance = wayfarer_core::open(full.root()).expect("open dataset");
    let results = instance.geocode("vasagatan");
    let address = results.first().expect("address result");
    assert_eq!(address.kind, Some(LocationType::Address));
    assert_eq!(address.house_number.as_deref(), Some("1"));
    assert_eq!(address.zip.as_deref(), Some("111 20"));
    assert!(address.category.is_none());
}

#[rstest]
fn reverse_geocode_finds_the_nearest_place(full: Dataset) {
    let instance = wayfarer_core::open(full.root()).expect("open dataset");
    assert!(instance.subsystems().contains(Subsystem::StreetNetwork));
    let near_central = Coordinate::new(59.3301, 18.0580);
    let first = instance.reverse_geocode(near_central).expect("nearest place");
    let second = instance.reverse_geocode(near_central).expect("nearest place");
    assert_eq!(first.place_id, "740000001");
    assert_eq!(first, second);
}

#[rstest]
fn routing_is_unavailable_on_snapshots(full: Dataset) {
    let instance = wayfarer_core::open(full.root()).expect("open dataset");
    assert!(!instance.subsystems().contains(Subsystem::Timetable));
    assert!(!instance.subsystems().contains(Subsystem::NetworkLookup));
    let routes = instance.plan_route(
        Coordinate::new(59.33, 18.06),
        Coordinate::new(59.32, 18.07),
        None,
    );
    assert!(routes.is_empty());
    assert!(instance.api_get("/api/v1/plan?fromPlace=1,2&toPlace=3,4").is_none());
}

#[rstest]
fn raw_geocode_returns_engine_records(full: Dataset) {
    let instance = wayfarer_core::open(full.root()).expect("open dataset");
    let text = instance
        .api_get("/api/v5/geocode?text=Centralbadet")
        .expect("geocode payload");
    let value: serde_json::Value = serde_json::from_str(&text).expect("payload is JSON");
    assert_eq!(value[0]["id"], "osm_n_1");
    assert_eq!(value[0]["tokens"], serde_json::json!([[0, 12]]));
}

#[rstest]
fn tiles_and_glyphs_are_served_from_disk(full: Dataset) {
    let instance = wayfarer_core::open(full.root()).expect("open dataset");
    assert_eq!(instance.get_tile(0, 0, 0).data_base64(), Some("GgB/"));
    assert!(!instance.get_tile(1, 1, 1).is_found());
    assert_eq!(
        instance
            .get_glyph("/tiles/glyphs/Noto%20Sans%20Display%20Regular/0-255.pbf")
            .data_base64(),
        Some("Z2x5cGhz")
    );
    assert!(!instance.get_glyph("/tiles/glyphs/../config.yml").is_found());
}

#[rstest]
fn tile_requests_without_a_tile_store_are_not_found(places_only: Dataset) {
    let instance = wayfarer_core::open(places_only.root()).expect("open dataset");
    assert!(!instance.subsystems().contains(Subsystem::TileStore));
    let payload = serde_json::to_value(instance.get_tile(0, 0, 0)).expect("serialize payload");
    assert_eq!(payload, serde_json::json!({"found": false}));
}

#[rstest]
fn empty_manifest_opens_with_no_subsystems() {
    let dataset = Dataset::new("");
    let instance = wayfarer_core::open(dataset.root()).expect("open dataset");
    assert!(instance.subsystems().is_empty());
    assert!(instance.geocode("anything").is_empty());
}

#[rstest]
fn missing_directory_fails_to_open() {
    let error = wayfarer_core::open("/nonexistent/wayfarer/dataset").expect_err("should fail");
    assert!(matches!(error, OpenError::MissingDataset { .. }));
}

#[rstest]
fn missing_manifest_fails_to_open() {
    let dir = TempDir::new().expect("create dataset dir");
    let root = Utf8Path::from_path(dir.path()).expect("utf8 temp path");
    let error = wayfarer_core::open(root).expect_err("should fail");
    assert!(matches!(error, OpenError::Read { .. }));
}

#[rstest]
#[case::declared_but_absent("places: places.json\n", None)]
#[case::malformed_record("places: places.json\n", Some(r#"[{"name": "x"}]"#))]
#[case::tiles_not_a_directory("tiles: tiles\n", None)]
fn broken_artefacts_fail_to_open(#[case] manifest: &str, #[case] places: Option<&str>) {
    let dataset = Dataset::new(manifest);
    if let Some(contents) = places {
        dataset.write("places.json", contents.as_bytes());
    }
    assert!(wayfarer_core::open(dataset.root()).is_err());
}

#[rstest]
fn unknown_manifest_keys_fail_to_open() {
    let dataset = Dataset::new("timetable: gtfs.zip\n");
    let error = wayfarer_core::open(dataset.root()).expect_err("should fail");
    assert!(matches!(error, OpenError::Manifest { .. }));
}
