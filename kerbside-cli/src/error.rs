//! Error types emitted by the kerbside CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use kerbside_core::{CoordinateError, SearchConfigError, SqliteIndexError};
use kerbside_data::ImportError;
use thiserror::Error;

/// Errors emitted by the kerbside CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A referenced input path does not exist on disk or is not a file.
    #[error("{field} path {path:?} does not exist or is not a file")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The `--lat`/`--lon` pair is not a valid position.
    #[error("invalid location: {0}")]
    InvalidCoordinate(#[from] CoordinateError),
    /// The search radii do not describe a usable search.
    #[error("invalid search settings: {0}")]
    InvalidSearch(#[from] SearchConfigError),
    /// Building the spatial index failed.
    #[error("import failed: {0}")]
    Import(#[from] ImportError),
    /// Loading the spatial index failed.
    #[error("failed to open spatial index: {0}")]
    OpenIndex(#[from] SqliteIndexError),
    /// Serializing command output failed.
    #[error("failed to serialize output: {0}")]
    SerializeOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
