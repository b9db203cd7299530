//! Test helpers for building extracts and indexes on disk.

use super::*;
use camino::Utf8PathBuf;
use kerbside_core::{
    Coordinate, RoadClass, StreetAttributes, WayId,
    test_support::{MemoryIndex, write_sqlite_index},
};
use tempfile::TempDir;

/// Main St through nodes 1 and 2; a footway continues from node 2 to node 3.
pub(super) const EXTRACT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6" generator="kerbside tests">
  <node id="1" lat="43.0" lon="-79.0"/>
  <node id="2" lat="43.0005" lon="-79.0"/>
  <node id="3" lat="43.001" lon="-79.001"/>
  <way id="100">
    <nd ref="1"/>
    <nd ref="2"/>
    <tag k="highway" v="residential"/>
    <tag k="name" v="Main St"/>
  </way>
  <way id="300">
    <nd ref="2"/>
    <nd ref="3"/>
    <tag k="highway" v="footway"/>
  </way>
</osm>
"#;

/// A scratch directory and its UTF-8 path.
pub(super) struct Scratch {
    _dir: TempDir,
    pub(super) root: Utf8PathBuf,
}

impl Scratch {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    /// Write [`EXTRACT`] as `name`, returning its path.
    pub(super) fn extract(&self, name: &str) -> Utf8PathBuf {
        let path = self.root.join(name);
        std::fs::write(&path, EXTRACT).expect("write extract");
        path
    }

    /// Persist Main St crossed by King St at node 3, returning the index path.
    pub(super) fn crossing_index(&self) -> Utf8PathBuf {
        let path = self.root.join("crossing.db");
        write_sqlite_index(path.as_std_path(), &crossing()).expect("write index");
        path
    }
}

fn coordinate(lat: f64, lon: f64) -> Coordinate {
    Coordinate::new(lat, lon).expect("valid test coordinate")
}

fn street(way_id: WayId, name: &str, declared_speed_kmh: u32) -> StreetAttributes {
    StreetAttributes {
        way_id,
        name: Some(name.to_owned()),
        lanes: 0,
        declared_speed_kmh,
        road_class: RoadClass::Residential,
        oneway: false,
    }
}

pub(super) fn crossing() -> MemoryIndex {
    MemoryIndex::default()
        .with_node(1, coordinate(43.0, -79.0))
        .with_node(2, coordinate(43.0005, -79.0))
        .with_node(3, coordinate(43.001, -79.0))
        .with_node(4, coordinate(43.001, -79.001))
        .with_way(street(100, "Main St", 0), &[1, 2, 3])
        .with_way(street(200, "King St", 40), &[3, 4])
}

/// Parse `args` as a `kerbside` invocation and run it, capturing stdout.
pub(super) fn invoke(args: &[&str]) -> Result<String, CliError> {
    let cli = Cli::try_parse_from(std::iter::once("kerbside").chain(args.iter().copied()))?;
    let mut output = Vec::new();
    run_with(cli, &mut output)?;
    Ok(String::from_utf8(output).expect("CLI output is UTF-8"))
}
