//! Table layout of the persisted spatial index.
//!
//! The importer creates these tables and the SQLite index reads them, so both
//! sides share the statements below.

/// Node coordinates. Only nodes referenced by a kept way survive pruning.
pub const CREATE_NODES: &str = "CREATE TABLE nodes (
    osmid INTEGER PRIMARY KEY,
    lon REAL NOT NULL,
    lat REAL NOT NULL
)";

/// Range queries scan latitude first.
pub const CREATE_NODES_LOCATION_INDEX: &str =
    "CREATE INDEX nodes_location ON nodes (lat, lon)";

/// Ordered node membership of each way.
pub const CREATE_WAY_NODES: &str = "CREATE TABLE way_nodes (
    id INTEGER PRIMARY KEY,
    wayid INTEGER NOT NULL,
    orderid INTEGER NOT NULL,
    osmid INTEGER NOT NULL,
    UNIQUE (wayid, orderid)
)";

pub const CREATE_WAY_NODES_NODE_INDEX: &str =
    "CREATE INDEX way_nodes_osmid ON way_nodes (osmid)";

/// Street attributes of each kept way. `0` means unknown for lanes and speed.
pub const CREATE_WAY_INFO: &str = "CREATE TABLE way_info (
    id INTEGER PRIMARY KEY,
    wayid INTEGER NOT NULL UNIQUE,
    street_name TEXT,
    num_of_lanes INTEGER NOT NULL DEFAULT 0,
    maxspeed INTEGER NOT NULL DEFAULT 0,
    street_type TEXT NOT NULL,
    oneway INTEGER NOT NULL DEFAULT 0
)";

/// Every statement needed to create an empty index, in order.
pub const CREATE_ALL: [&str; 5] = [
    CREATE_NODES,
    CREATE_NODES_LOCATION_INDEX,
    CREATE_WAY_NODES,
    CREATE_WAY_NODES_NODE_INDEX,
    CREATE_WAY_INFO,
];

pub const INSERT_NODE: &str = "INSERT INTO nodes (osmid, lon, lat) VALUES (?1, ?2, ?3)";

pub const INSERT_WAY_NODE: &str =
    "INSERT INTO way_nodes (wayid, orderid, osmid) VALUES (?1, ?2, ?3)";

pub const INSERT_WAY_INFO: &str = "INSERT INTO way_info \
    (wayid, street_name, num_of_lanes, maxspeed, street_type, oneway) \
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

/// Drop nodes that no kept way references.
pub const PRUNE_ORPHAN_NODES: &str =
    "DELETE FROM nodes WHERE osmid NOT IN (SELECT osmid FROM way_nodes)";

pub const SELECT_NODES: &str = "SELECT osmid, lon, lat FROM nodes ORDER BY osmid";

pub const SELECT_WAY_NODES: &str =
    "SELECT wayid, orderid, osmid FROM way_nodes ORDER BY osmid, wayid, orderid";

pub const SELECT_WAY_INFO: &str = "SELECT wayid, street_name, num_of_lanes, maxspeed, \
    street_type, oneway FROM way_info ORDER BY wayid";

/// Count and extent of the surviving nodes: `(count, min lon, min lat, max lon, max lat)`.
pub const SUMMARISE_NODES: &str =
    "SELECT COUNT(*), MIN(lon), MIN(lat), MAX(lon), MAX(lat) FROM nodes";
