//! Facade crate for kerbside street awareness.
//!
//! This crate re-exports the core geodesy, index, resolver and tracker types
//! and, behind the `import` feature, the OSM importer.

#![forbid(unsafe_code)]

pub use kerbside_core::{
    ClosestNode, Coordinate, CoordinateError, DEFAULT_FIELD_OF_VISION_DEGREES, EARTH_RADIUS_KM,
    FALLBACK_SPEED_KMH, FixDelivery, GeoError, Heading, IndexedNode, LocationTracker,
    NearestNodeResolver, NodeId, PositionFix, ResolutionEvent, RoadClass, STATIONARY_THRESHOLD_KMH,
    SearchBox, SearchConfig, SearchConfigError, SpatialIndex, SpeedSource, Street,
    StreetAttributes, StreetGraph, StreetReport, TrackerError, TrackerSession, WayId,
    WayMembership, bearing_between, create_box, create_box_with_radius, distance_between,
    distance_between_with_radius, is_in_sight,
};

#[cfg(feature = "store-sqlite")]
pub use kerbside_core::{SqliteIndexError, SqliteSpatialIndex};

#[cfg(feature = "import")]
pub use kerbside_data::{ImportConfig, ImportError, ImportReport, import_osm};
