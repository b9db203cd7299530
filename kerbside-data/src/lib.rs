//! Offline import of OSM XML extracts into kerbside spatial index files.
//!
//! Responsibilities:
//! - Refuse unsafe runs: an existing destination, a missing source or one
//!   that does not look like OSM XML.
//! - Stream nodes and ways, keeping ways whose road class is whitelisted.
//! - Persist nodes, ordered way membership and street attributes, then prune
//!   nodes that no kept way references.
//!
//! Boundaries:
//! - Table layout lives in `kerbside_core::store::schema`; reading the index
//!   back is `kerbside-core`'s job.
//!
//! Invariants:
//! - The destination only appears once the index is complete and closed.
//! - Duplicate ids and malformed tags never abort an import.

mod config;
mod error;
mod import;
mod reader;
mod report;
mod sqlite;
mod tags;
mod validate;

pub use config::ImportConfig;
pub use error::ImportError;
pub use import::{import_osm, write_index};
pub use reader::{OsmElement, OsmXmlReader};
pub use report::ImportReport;
pub use validate::{OSM_EXTENSION, check_paths};
