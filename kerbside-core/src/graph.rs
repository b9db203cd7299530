//! Street lookups layered over a [`SpatialIndex`].

use crate::{Coordinate, NodeId, SpatialIndex, Street, WayId};

/// Resolves nodes to the streets that pass through them.
#[derive(Debug, Clone, Copy)]
pub struct StreetGraph<I> {
    index: I,
}

impl<I: SpatialIndex> StreetGraph<I> {
    pub fn new(index: I) -> Self {
        Self { index }
    }

    /// Coordinate of `node`, if indexed.
    pub fn node_coordinates(&self, node: NodeId) -> Option<Coordinate> {
        self.index.node_coordinates(node)
    }

    /// Distinct ways containing `node`, in ascending id order.
    pub fn ways_through(&self, node: NodeId) -> Vec<WayId> {
        let mut ways: Vec<WayId> = self
            .index
            .way_memberships(node)
            .iter()
            .map(|membership| membership.way_id)
            .collect();
        ways.dedup();
        ways
    }

    /// `true` when `node` has more than one way membership.
    ///
    /// Memberships are counted per position, so the start of a closed way
    /// that returns to it counts twice.
    pub fn is_intersection(&self, node: NodeId) -> bool {
        self.index.way_memberships(node).len() > 1
    }

    /// Streets passing through `node`; empty for unknown nodes.
    ///
    /// Memberships whose way has no stored attributes are skipped.
    ///
    /// # Examples
    /// ```
    /// use kerbside_core::{
    ///     Coordinate, RoadClass, StreetAttributes, StreetGraph, test_support::MemoryIndex,
    /// };
    ///
    /// # fn main() -> Result<(), kerbside_core::CoordinateError> {
    /// let index = MemoryIndex::default()
    ///     .with_node(1, Coordinate::new(43.0, -79.0)?)
    ///     .with_way(
    ///         StreetAttributes {
    ///             way_id: 100,
    ///             name: Some("Main St".into()),
    ///             lanes: 0,
    ///             declared_speed_kmh: 0,
    ///             road_class: RoadClass::Residential,
    ///             oneway: false,
    ///         },
    ///         &[1],
    ///     );
    /// let graph = StreetGraph::new(&index);
    /// let streets = graph.fetch_streets(1);
    /// assert_eq!(streets[0].display_name(), "Main St");
    /// assert_eq!(streets[0].max_speed_kmh, 50);
    /// assert!(!graph.is_intersection(1));
    /// # Ok(())
    /// # }
    /// ```
    pub fn fetch_streets(&self, node: NodeId) -> Vec<Street> {
        self.ways_through(node)
            .into_iter()
            .filter_map(|way| self.index.street_attributes(way).cloned())
            .map(Street::from)
            .collect()
    }
}
