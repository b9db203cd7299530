//! SQLite-backed spatial index.
//!
//! The database is opened read-only and loaded once: node coordinates go into
//! an R\*-tree, memberships and street attributes into hash maps. The loaded
//! value is immutable, so concurrent readers need no coordination.

use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
};

use geo::Rect;
use log::info;
use rstar::{AABB, RTree, RTreeObject};
use rusqlite::{Connection, OpenFlags, Row};
use thiserror::Error;

use crate::{
    Coordinate, CoordinateError, NodeId, RoadClass, StreetAttributes, WayId, WayMembership,
};

use super::{IndexedNode, SpatialIndex, schema};

/// Error raised when opening or loading a persisted index.
#[derive(Debug, Error)]
pub enum SqliteIndexError {
    /// Opening the SQLite database failed.
    #[error("failed to open spatial index at {path}: {source}")]
    Open {
        /// Location of the SQLite database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A query against one of the index tables failed.
    #[error("failed to {operation}: {source}")]
    Query {
        /// Short description of the failed step.
        operation: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A stored node carried an invalid coordinate.
    #[error("node {node} has an invalid coordinate: {source}")]
    InvalidCoordinate {
        /// Identifier of the offending node.
        node: NodeId,
        /// Validation failure.
        #[source]
        source: CoordinateError,
    },
    /// A stored lane count or speed did not fit an unsigned 32-bit value.
    #[error("way {way} has an out-of-range {column} value {value}")]
    InvalidAttribute {
        /// Identifier of the offending way.
        way: WayId,
        /// Column holding the value.
        column: &'static str,
        /// Value as stored.
        value: i64,
    },
    /// A way membership carried a negative order.
    #[error("way {way} lists node {node} at negative position {order}")]
    InvalidOrder {
        /// Way owning the membership row.
        way: WayId,
        /// Node referenced by the row.
        node: NodeId,
        /// Position as stored.
        order: i64,
    },
}

impl RTreeObject for IndexedNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.coordinate.lon(), self.coordinate.lat()])
    }
}

/// Read-only spatial index loaded from a SQLite database.
pub struct SqliteSpatialIndex {
    nodes: RTree<IndexedNode>,
    coordinates: HashMap<NodeId, Coordinate>,
    memberships: HashMap<NodeId, Vec<WayMembership>>,
    streets: HashMap<WayId, StreetAttributes>,
}

impl fmt::Debug for SqliteSpatialIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteSpatialIndex")
            .field("nodes", &self.nodes.size())
            .field("streets", &self.streets.len())
            .finish_non_exhaustive()
    }
}

impl SqliteSpatialIndex {
    /// Open and load the index stored at `path`.
    ///
    /// # Examples
    /// ```no_run
    /// use kerbside_core::SqliteSpatialIndex;
    ///
    /// let index = SqliteSpatialIndex::open("oshawa.db")?;
    /// println!("{} nodes", index.node_count());
    /// # Ok::<(), kerbside_core::SqliteIndexError>(())
    /// ```
    pub fn open<P>(path: P) -> Result<Self, SqliteIndexError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let connection = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|source| SqliteIndexError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        let entries = load_nodes(&connection)?;
        let memberships = load_memberships(&connection)?;
        let streets = load_streets(&connection)?;

        let coordinates = entries
            .iter()
            .map(|node| (node.id, node.coordinate))
            .collect();
        let index = Self {
            nodes: RTree::bulk_load(entries),
            coordinates,
            memberships,
            streets,
        };
        info!(
            "loaded spatial index {}: {} nodes, {} ways",
            path.display(),
            index.node_count(),
            index.way_count()
        );
        Ok(index)
    }

    /// Number of indexed nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.size()
    }

    /// Number of ways with street attributes.
    pub fn way_count(&self) -> usize {
        self.streets.len()
    }
}

impl SpatialIndex for SqliteSpatialIndex {
    fn nodes_in_box(&self, bbox: &Rect<f64>) -> Box<dyn Iterator<Item = IndexedNode> + Send + '_> {
        let envelope =
            AABB::from_corners([bbox.min().x, bbox.min().y], [bbox.max().x, bbox.max().y]);
        let mut nodes: Vec<_> = self
            .nodes
            .locate_in_envelope_intersecting(&envelope)
            .copied()
            .collect();

        nodes.sort_unstable_by_key(|node| node.id);

        Box::new(nodes.into_iter())
    }

    fn node_coordinates(&self, node: NodeId) -> Option<Coordinate> {
        self.coordinates.get(&node).copied()
    }

    fn way_memberships(&self, node: NodeId) -> &[WayMembership] {
        self.memberships.get(&node).map_or(&[], Vec::as_slice)
    }

    fn street_attributes(&self, way: WayId) -> Option<&StreetAttributes> {
        self.streets.get(&way)
    }
}

fn select<T, F>(
    connection: &Connection,
    sql: &str,
    operation: &'static str,
    mut map_row: F,
) -> Result<Vec<T>, SqliteIndexError>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let query_error = |source| SqliteIndexError::Query { operation, source };
    let mut statement = connection.prepare(sql).map_err(query_error)?;
    let rows = statement
        .query_map([], |row| map_row(row))
        .map_err(query_error)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(query_error)
}

fn load_nodes(connection: &Connection) -> Result<Vec<IndexedNode>, SqliteIndexError> {
    let rows = select(connection, schema::SELECT_NODES, "read nodes", |row| {
        Ok((
            row.get::<_, NodeId>(0)?,
            row.get::<_, f64>(1)?,
            row.get::<_, f64>(2)?,
        ))
    })?;

    rows.into_iter()
        .map(|(id, lon, lat)| {
            let coordinate = Coordinate::new(lat, lon)
                .map_err(|source| SqliteIndexError::InvalidCoordinate { node: id, source })?;
            Ok(IndexedNode { id, coordinate })
        })
        .collect()
}

fn load_memberships(
    connection: &Connection,
) -> Result<HashMap<NodeId, Vec<WayMembership>>, SqliteIndexError> {
    let rows = select(
        connection,
        schema::SELECT_WAY_NODES,
        "read way memberships",
        |row| {
            Ok((
                row.get::<_, WayId>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, NodeId>(2)?,
            ))
        },
    )?;

    let mut memberships: HashMap<NodeId, Vec<WayMembership>> = HashMap::new();
    for (way, order, node) in rows {
        let order =
            u32::try_from(order).map_err(|_| SqliteIndexError::InvalidOrder { way, node, order })?;
        memberships.entry(node).or_default().push(WayMembership {
            way_id: way,
            order,
        });
    }
    Ok(memberships)
}

fn load_streets(
    connection: &Connection,
) -> Result<HashMap<WayId, StreetAttributes>, SqliteIndexError> {
    let rows = select(connection, schema::SELECT_WAY_INFO, "read way info", |row| {
        Ok((
            row.get::<_, WayId>(0)?,
            row.get::<_, Option<String>>(1)?,
            row.get::<_, i64>(2)?,
            row.get::<_, i64>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, i64>(5)?,
        ))
    })?;

    rows.into_iter()
        .map(|(way, name, lanes, maxspeed, street_type, oneway)| {
            let attributes = StreetAttributes {
                way_id: way,
                name,
                lanes: unsigned(way, "num_of_lanes", lanes)?,
                declared_speed_kmh: unsigned(way, "maxspeed", maxspeed)?,
                road_class: RoadClass::from(street_type),
                oneway: oneway != 0,
            };
            Ok((way, attributes))
        })
        .collect()
}

fn unsigned(way: WayId, column: &'static str, value: i64) -> Result<u32, SqliteIndexError> {
    u32::try_from(value).map_err(|_| SqliteIndexError::InvalidAttribute { way, column, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MemoryIndex, write_sqlite_index};
    use rstest::{fixture, rstest};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn coordinate(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).expect("valid test coordinate")
    }

    fn street(way_id: WayId, name: &str, declared_speed_kmh: u32) -> StreetAttributes {
        StreetAttributes {
            way_id,
            name: Some(name.to_owned()),
            lanes: 2,
            declared_speed_kmh,
            road_class: RoadClass::Residential,
            oneway: false,
        }
    }

    #[fixture]
    fn temp_database() -> (TempDir, PathBuf) {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("index.db");
        (dir, path)
    }

    #[fixture]
    fn sample_index() -> MemoryIndex {
        MemoryIndex::default()
            .with_node(1, coordinate(43.0, -79.0))
            .with_node(2, coordinate(43.0005, -79.0))
            .with_node(3, coordinate(43.001, -79.0))
            .with_node(4, coordinate(43.001, -79.001))
            .with_way(street(100, "Main St", 0), &[1, 2, 3])
            .with_way(street(200, "King St", 40), &[3, 4])
    }

    #[fixture]
    fn opened(
        #[from(temp_database)] (dir, path): (TempDir, PathBuf),
        sample_index: MemoryIndex,
    ) -> (TempDir, SqliteSpatialIndex) {
        write_sqlite_index(&path, &sample_index).expect("persist index");
        let index = SqliteSpatialIndex::open(&path).expect("open index");
        (dir, index)
    }

    #[rstest]
    fn loads_every_table(opened: (TempDir, SqliteSpatialIndex)) {
        let (_dir, index) = opened;
        assert_eq!(index.node_count(), 4);
        assert_eq!(index.way_count(), 2);
        assert_eq!(index.node_coordinates(2), Some(coordinate(43.0005, -79.0)));
        assert_eq!(
            index.way_memberships(3),
            &[
                WayMembership {
                    way_id: 100,
                    order: 2
                },
                WayMembership {
                    way_id: 200,
                    order: 0
                },
            ]
        );
        let king = index.street_attributes(200).expect("way 200 is indexed");
        assert_eq!(king.declared_speed_kmh, 40);
        assert_eq!(king.name.as_deref(), Some("King St"));
    }

    #[rstest]
    fn range_query_is_sorted_by_id(opened: (TempDir, SqliteSpatialIndex)) {
        let (_dir, index) = opened;
        let bbox = Rect::new(
            geo::Coord {
                x: -79.0015,
                y: 42.9995,
            },
            geo::Coord {
                x: -78.9995,
                y: 43.0015,
            },
        );
        let ids: Vec<_> = index.nodes_in_box(&bbox).map(|node| node.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[rstest]
    fn missing_database_fails_to_open(#[from(temp_database)] (_dir, path): (TempDir, PathBuf)) {
        let error = SqliteSpatialIndex::open(&path).expect_err("database does not exist");
        assert!(matches!(error, SqliteIndexError::Open { .. }));
    }

    #[rstest]
    fn missing_tables_fail_to_load(#[from(temp_database)] (_dir, path): (TempDir, PathBuf)) {
        Connection::open(&path).expect("create empty database");
        let error = SqliteSpatialIndex::open(&path).expect_err("tables are missing");
        assert!(matches!(
            error,
            SqliteIndexError::Query {
                operation: "read nodes",
                ..
            }
        ));
    }

    #[rstest]
    fn rejects_out_of_range_coordinates(#[from(temp_database)] (_dir, path): (TempDir, PathBuf)) {
        let connection = Connection::open(&path).expect("create database");
        for statement in schema::CREATE_ALL {
            connection.execute(statement, []).expect("create schema");
        }
        connection
            .execute(schema::INSERT_NODE, rusqlite::params![9, -79.0, 123.0])
            .expect("insert node");
        drop(connection);

        let error = SqliteSpatialIndex::open(&path).expect_err("latitude is invalid");
        assert!(matches!(
            error,
            SqliteIndexError::InvalidCoordinate { node: 9, .. }
        ));
    }

    #[rstest]
    fn unknown_road_classes_load_as_other(#[from(temp_database)] (_dir, path): (TempDir, PathBuf)) {
        let mut attributes = street(300, "Trail", 0);
        attributes.road_class = RoadClass::Other("track".into());
        let source = MemoryIndex::default()
            .with_node(1, coordinate(0.0, 0.0))
            .with_way(attributes.clone(), &[1]);
        write_sqlite_index(&path, &source).expect("persist index");

        let index = SqliteSpatialIndex::open(&path).expect("open index");
        assert_eq!(index.street_attributes(300), Some(&attributes));
    }
}
