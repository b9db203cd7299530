//! Shared fixtures for the behaviour and integration tests.
#![allow(dead_code, reason = "each test target uses a different subset")]

use kerbside_core::{
    Coordinate, NodeId, RoadClass, SqliteSpatialIndex, StreetAttributes, WayId,
    test_support::{MemoryIndex, write_sqlite_index},
};
use tempfile::TempDir;

pub fn coordinate(lat: f64, lon: f64) -> Coordinate {
    Coordinate::new(lat, lon).expect("valid test coordinate")
}

pub fn residential(way_id: WayId, name: &str, declared_speed_kmh: u32) -> StreetAttributes {
    StreetAttributes {
        way_id,
        name: Some(name.to_owned()),
        lanes: 0,
        declared_speed_kmh,
        road_class: RoadClass::Residential,
        oneway: false,
    }
}

/// Main St (way 100) runs north through node 1 (43.0, -79.0) and node 2
/// (43.0005, -79.0).
pub fn main_street() -> MemoryIndex {
    MemoryIndex::default()
        .with_node(1, coordinate(43.0, -79.0))
        .with_node(2, coordinate(43.0005, -79.0))
        .with_way(residential(100, "Main St", 0), &[1, 2])
}

/// Main St continues to node 3 where King St (way 200, 40 km/h) leaves west
/// towards node 4.
pub fn crossing() -> MemoryIndex {
    MemoryIndex::default()
        .with_node(1, coordinate(43.0, -79.0))
        .with_node(2, coordinate(43.0005, -79.0))
        .with_node(3, coordinate(43.001, -79.0))
        .with_node(4, coordinate(43.001, -79.001))
        .with_way(residential(100, "Main St", 0), &[1, 2, 3])
        .with_way(residential(200, "King St", 40), &[3, 4])
}

/// Persist `index` to a scratch database and load it back.
pub fn persist(index: &MemoryIndex) -> (TempDir, SqliteSpatialIndex) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("index.db");
    write_sqlite_index(&path, index).expect("persist index");
    let loaded = SqliteSpatialIndex::open(&path).expect("open index");
    (dir, loaded)
}

/// Coordinate of `node` in the fixtures above.
pub fn node_location(index: &MemoryIndex, node: NodeId) -> Coordinate {
    use kerbside_core::SpatialIndex;
    index
        .node_coordinates(node)
        .unwrap_or_else(|| panic!("node {node} is part of the fixture"))
}

/// Assert that two scenario title lists match in order.
pub fn assert_scenario_order(feature: &str, expected: &[&str]) {
    let path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(feature);
    let contents = std::fs::read_to_string(&path).unwrap_or_else(|err| {
        panic!("failed to read feature file {path:?}: {err}");
    });
    let titles: Vec<&str> = contents
        .lines()
        .filter_map(|line| line.trim().strip_prefix("Scenario: "))
        .collect();
    assert_eq!(titles, expected, "scenario order changed in {feature}");
}
