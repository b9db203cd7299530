//! Read-only access to the road-graph spatial index.
//!
//! The [`SpatialIndex`] trait is the query surface the resolver, street graph
//! and tracker consume. A loaded index never changes, so implementations are
//! expected to be shareable across threads without locking.

use std::sync::Arc;

use geo::Rect;

use crate::{Coordinate, NodeId, StreetAttributes, WayId, WayMembership};

pub mod schema;
#[cfg(feature = "store-sqlite")]
mod sqlite;

#[cfg(feature = "store-sqlite")]
pub use sqlite::{SqliteIndexError, SqliteSpatialIndex};

/// A node returned from a range query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedNode {
    /// OSM id of the node.
    pub id: NodeId,
    /// Stored position of the node.
    pub coordinate: Coordinate,
}

/// Read-only access to persisted nodes, way memberships and streets.
///
/// Bounding boxes use WGS84 with `x = longitude` and `y = latitude`.
///
/// # Examples
///
/// ```rust
/// use geo::{Coord, Rect};
/// use kerbside_core::{Coordinate, SpatialIndex, test_support::MemoryIndex};
///
/// # fn main() -> Result<(), kerbside_core::CoordinateError> {
/// let index = MemoryIndex::default().with_node(1, Coordinate::new(43.0, -79.0)?);
/// let bbox = Rect::new(Coord { x: -79.5, y: 42.5 }, Coord { x: -78.5, y: 43.5 });
/// let ids: Vec<_> = index.nodes_in_box(&bbox).map(|node| node.id).collect();
/// assert_eq!(ids, vec![1]);
/// # Ok(())
/// # }
/// ```
pub trait SpatialIndex {
    /// Return every node whose coordinate lies within `bbox`.
    ///
    /// Containment includes boundary points. The rectangle never crosses
    /// the antimeridian; callers split wrapped boxes into two ranges.
    fn nodes_in_box(&self, bbox: &Rect<f64>) -> Box<dyn Iterator<Item = IndexedNode> + Send + '_>;

    /// Coordinate of `node`, if indexed.
    fn node_coordinates(&self, node: NodeId) -> Option<Coordinate>;

    /// Ways containing `node`, ordered by way id then position. Empty when
    /// the node is unknown.
    fn way_memberships(&self, node: NodeId) -> &[WayMembership];

    /// Street attributes persisted for `way`.
    fn street_attributes(&self, way: WayId) -> Option<&StreetAttributes>;
}

impl<T: SpatialIndex + ?Sized> SpatialIndex for &T {
    fn nodes_in_box(&self, bbox: &Rect<f64>) -> Box<dyn Iterator<Item = IndexedNode> + Send + '_> {
        (**self).nodes_in_box(bbox)
    }

    fn node_coordinates(&self, node: NodeId) -> Option<Coordinate> {
        (**self).node_coordinates(node)
    }

    fn way_memberships(&self, node: NodeId) -> &[WayMembership] {
        (**self).way_memberships(node)
    }

    fn street_attributes(&self, way: WayId) -> Option<&StreetAttributes> {
        (**self).street_attributes(way)
    }
}

impl<T: SpatialIndex + ?Sized> SpatialIndex for Arc<T> {
    fn nodes_in_box(&self, bbox: &Rect<f64>) -> Box<dyn Iterator<Item = IndexedNode> + Send + '_> {
        (**self).nodes_in_box(bbox)
    }

    fn node_coordinates(&self, node: NodeId) -> Option<Coordinate> {
        (**self).node_coordinates(node)
    }

    fn way_memberships(&self, node: NodeId) -> &[WayMembership] {
        (**self).way_memberships(node)
    }

    fn street_attributes(&self, way: WayId) -> Option<&StreetAttributes> {
        (**self).street_attributes(way)
    }
}
