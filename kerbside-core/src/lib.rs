//! Core domain types and algorithms for kerbside.
//!
//! The crate resolves live position fixes to the nearest road-graph node and
//! the streets that meet there. It provides the geodetic primitives, the
//! read-only [`SpatialIndex`] abstraction with a SQLite-backed
//! implementation, the expanding-radius [`NearestNodeResolver`], street
//! lookups through [`StreetGraph`] and the [`LocationTracker`] state machine.

#![cfg_attr(docsrs, feature(doc_cfg))]

mod coordinate;
mod geodesy;
mod graph;
mod resolver;
mod road;
pub mod store;
pub mod test_support;
mod tracker;

pub use coordinate::{Coordinate, CoordinateError};
pub use geodesy::{
    DEFAULT_FIELD_OF_VISION_DEGREES, EARTH_RADIUS_KM, GeoError, Heading, SearchBox,
    bearing_between, create_box, create_box_with_radius, distance_between,
    distance_between_with_radius, is_in_sight,
};
pub use graph::StreetGraph;
pub use resolver::{ClosestNode, NearestNodeResolver, SearchConfig, SearchConfigError};
pub use road::{
    FALLBACK_SPEED_KMH, NodeId, RoadClass, SpeedSource, Street, StreetAttributes, WayId,
    WayMembership,
};
#[cfg(feature = "store-sqlite")]
#[cfg_attr(docsrs, doc(cfg(feature = "store-sqlite")))]
pub use store::{SqliteIndexError, SqliteSpatialIndex};
pub use store::{IndexedNode, SpatialIndex};
pub use tracker::{
    FixDelivery, LocationTracker, PositionFix, ResolutionEvent, STATIONARY_THRESHOLD_KMH,
    StreetReport, TrackerError, TrackerSession,
};
