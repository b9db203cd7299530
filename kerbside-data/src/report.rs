//! Summary returned by a finished import.

use geo::Rect;

/// Counts gathered while importing an extract.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ImportReport {
    /// Nodes seen in the extract, including rejected ones.
    pub nodes_read: u64,
    /// Ways seen in the extract.
    pub ways_read: u64,
    /// Ways whose road class passed the filter and were written.
    pub ways_kept: u64,
    /// Ways without a `highway` tag or with an excluded road class.
    pub ways_filtered: u64,
    /// Nodes skipped because their id had already been written.
    pub duplicate_nodes: u64,
    /// Ways skipped because their id had already been written.
    pub duplicate_ways: u64,
    /// Nodes skipped for missing or out-of-range coordinates.
    pub invalid_nodes: u64,
    /// Written nodes removed because no kept way references them.
    pub nodes_pruned: u64,
    /// Nodes left in the index.
    pub nodes_retained: u64,
    /// Box spanning the retained nodes, `x = longitude`, `y = latitude`.
    pub bounds: Option<Rect<f64>>,
}
