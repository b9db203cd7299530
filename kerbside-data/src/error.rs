//! Failures that abort an import run.

use camino::Utf8PathBuf;
use rusqlite::Error as SqliteError;
use thiserror::Error;

/// Errors raised while building a spatial index from an OSM extract.
///
/// Every variant is fatal. Anomalies inside the extract (duplicate ids,
/// unparseable tags) are logged and counted in [`crate::ImportReport`]
/// instead.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The destination index already exists and would be overwritten.
    #[error("output file already exists: {path}")]
    OutputExists {
        /// Destination that was found in place.
        path: Utf8PathBuf,
    },
    /// The source extract is not a regular file.
    #[error("input file does not exist: {path}")]
    MissingSource {
        /// Path that was expected to hold the extract.
        path: Utf8PathBuf,
    },
    /// Probing the source or destination failed.
    #[error("failed to inspect {path}")]
    InspectSource {
        /// Path being probed.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The second line of the extract lacks an `<osm ... version` marker.
    #[error("{path} does not appear to be an OSM XML file")]
    InvalidSource {
        /// Path of the rejected extract.
        path: Utf8PathBuf,
    },
    /// The extract does not carry the case-sensitive `.osm` extension.
    #[error("{path} has an unexpected extension; expected a `.osm` file")]
    UnexpectedExtension {
        /// Path of the rejected extract.
        path: Utf8PathBuf,
    },
    /// Opening the extract for parsing failed.
    #[error("failed to read OSM extract at {path}")]
    ReadSource {
        /// Path of the extract.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The extract is not well-formed XML.
    #[error("malformed OSM XML at byte {position}")]
    Xml {
        /// Byte offset reported by the parser.
        position: u64,
        /// Source error produced by `quick-xml`.
        #[source]
        source: quick_xml::Error,
    },
    /// Creating the staging file beside the destination failed.
    #[error("failed to stage index in {path}")]
    Stage {
        /// Directory that should hold the staged file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the staged SQLite database failed.
    #[error("failed to open SQLite database at {path}")]
    Open {
        /// Staged database path.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Beginning the import transaction failed.
    #[error("failed to begin import transaction")]
    BeginTransaction {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Creating the index tables failed.
    #[error("failed to create index schema")]
    CreateSchema {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Preparing an insert statement failed.
    #[error("failed to prepare {table} insert statement")]
    Prepare {
        /// Table the statement targets.
        table: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Writing a row failed for a reason other than a duplicate id.
    #[error("failed to insert {table} row for id {id}")]
    Insert {
        /// Table being written.
        table: &'static str,
        /// Node or way id of the row.
        id: i64,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Removing orphan nodes or summarising the survivors failed.
    #[error("failed to prune orphan nodes")]
    Prune {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Committing the import transaction failed.
    #[error("failed to commit import transaction")]
    Commit {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Closing the staged database failed.
    #[error("failed to close SQLite database at {path}")]
    Close {
        /// Staged database path.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Moving the staged index into place failed.
    #[error("failed to move staged index to {path}")]
    Persist {
        /// Destination path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ImportError {
    pub(crate) fn xml(position: u64, source: impl Into<quick_xml::Error>) -> Self {
        Self::Xml {
            position,
            source: source.into(),
        }
    }
}
