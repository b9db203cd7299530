//! In-memory `SpatialIndex` and fixture writers shared by unit, behaviour and
//! downstream crate tests.

use std::collections::{BTreeMap, HashMap};

use geo::{Coord, Intersects, Rect};

use crate::{
    Coordinate, IndexedNode, NodeId, SpatialIndex, StreetAttributes, WayId, WayMembership,
};

/// In-memory `SpatialIndex` implementation used in tests.
///
/// Range queries perform a linear scan in ascending node id order and are
/// intended only for small datasets.
#[derive(Debug, Default, Clone)]
pub struct MemoryIndex {
    nodes: BTreeMap<NodeId, Coordinate>,
    ways: BTreeMap<WayId, (StreetAttributes, Vec<NodeId>)>,
    memberships: HashMap<NodeId, Vec<WayMembership>>,
}

impl MemoryIndex {
    /// Add or replace a node.
    #[must_use]
    pub fn with_node(mut self, id: NodeId, coordinate: Coordinate) -> Self {
        self.nodes.insert(id, coordinate);
        self
    }

    /// Add a way passing through `nodes` in order.
    ///
    /// Node coordinates are not required; memberships to unknown nodes mirror
    /// an index whose coordinate table was pruned independently.
    #[must_use]
    pub fn with_way(mut self, attributes: StreetAttributes, nodes: &[NodeId]) -> Self {
        let way_id = attributes.way_id;
        for (order, node) in (0_u32..).zip(nodes) {
            let entries = self.memberships.entry(*node).or_default();
            entries.push(WayMembership { way_id, order });
            entries.sort_unstable();
        }
        self.ways.insert(way_id, (attributes, nodes.to_vec()));
        self
    }

    /// Every node in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = IndexedNode> + '_ {
        self.nodes.iter().map(|(id, coordinate)| IndexedNode {
            id: *id,
            coordinate: *coordinate,
        })
    }

    /// Every way with its ordered node list, in ascending way id order.
    pub fn ways(&self) -> impl Iterator<Item = (&StreetAttributes, &[NodeId])> + '_ {
        self.ways
            .values()
            .map(|(attributes, nodes)| (attributes, nodes.as_slice()))
    }
}

impl SpatialIndex for MemoryIndex {
    fn nodes_in_box(&self, bbox: &Rect<f64>) -> Box<dyn Iterator<Item = IndexedNode> + Send + '_> {
        let bbox = *bbox;
        Box::new(
            self.nodes()
                // `Intersects` treats boundary points as inside the rectangle.
                .filter(move |node| bbox.intersects(&Coord::from(node.coordinate))),
        )
    }

    fn node_coordinates(&self, node: NodeId) -> Option<Coordinate> {
        self.nodes.get(&node).copied()
    }

    fn way_memberships(&self, node: NodeId) -> &[WayMembership] {
        self.memberships.get(&node).map_or(&[], Vec::as_slice)
    }

    fn street_attributes(&self, way: WayId) -> Option<&StreetAttributes> {
        self.ways.get(&way).map(|(attributes, _)| attributes)
    }
}

/// Persist `index` as a SQLite spatial index at `path`.
#[cfg(feature = "store-sqlite")]
pub fn write_sqlite_index(
    path: &std::path::Path,
    index: &MemoryIndex,
) -> Result<(), rusqlite::Error> {
    use crate::store::schema;
    use rusqlite::{Connection, params};

    let mut connection = Connection::open(path)?;
    let transaction = connection.transaction()?;
    for statement in schema::CREATE_ALL {
        transaction.execute(statement, [])?;
    }
    {
        let mut insert_node = transaction.prepare(schema::INSERT_NODE)?;
        for node in index.nodes() {
            insert_node.execute(params![
                node.id,
                node.coordinate.lon(),
                node.coordinate.lat()
            ])?;
        }

        let mut insert_way = transaction.prepare(schema::INSERT_WAY_INFO)?;
        let mut insert_member = transaction.prepare(schema::INSERT_WAY_NODE)?;
        for (attributes, nodes) in index.ways() {
            insert_way.execute(params![
                attributes.way_id,
                attributes.name,
                attributes.lanes,
                attributes.declared_speed_kmh,
                attributes.road_class.as_str(),
                attributes.oneway,
            ])?;
            for (order, node) in (0_u32..).zip(nodes) {
                insert_member.execute(params![attributes.way_id, order, node])?;
            }
        }
    }
    transaction.commit()?;
    connection.close().map_err(|(_, error)| error)
}
