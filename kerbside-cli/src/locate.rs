//! `locate` command: resolve one position against a spatial index.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use kerbside_core::{
    Coordinate, NearestNodeResolver, NodeId, SearchConfig, SpatialIndex, SqliteSpatialIndex,
    Street, StreetGraph,
};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_LOCATE_INDEX, ARG_LOCATE_LAT, ARG_LOCATE_LON, CliError, ENV_LOCATE_INDEX, ENV_LOCATE_LAT,
    ENV_LOCATE_LON, write_json,
};

/// Printed when no indexed node lies within the search cap.
pub(crate) const UNKNOWN_LOCATION: &str = "unknown location";

/// CLI arguments for the `locate` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Find the indexed node closest to a position and print it \
                 with the streets that pass through it as JSON. Prints \
                 \"unknown location\" when nothing lies within the search cap.",
    about = "Resolve a position to its nearest node and streets"
)]
#[ortho_config(prefix = "KERBSIDE")]
pub(crate) struct LocateArgs {
    /// Path to a spatial index built by `import`.
    #[arg(long = ARG_LOCATE_INDEX, value_name = "path")]
    #[serde(default)]
    pub(crate) index: Option<Utf8PathBuf>,
    /// Latitude in decimal degrees.
    #[arg(long = ARG_LOCATE_LAT, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    /// Longitude in decimal degrees.
    #[arg(long = ARG_LOCATE_LON, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lon: Option<f64>,
    /// Give up once the search box reaches this radius.
    #[arg(long = "max-radius-km", value_name = "km")]
    #[serde(default)]
    pub(crate) max_radius_km: Option<f64>,
}

impl LocateArgs {
    pub(crate) fn into_options(self) -> Result<LocateOptions, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        LocateOptions::try_from(merged)
    }
}

/// Resolved `locate` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LocateOptions {
    pub(crate) index: Utf8PathBuf,
    pub(crate) at: Coordinate,
    pub(crate) search: SearchConfig,
}

impl LocateOptions {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.index, ARG_LOCATE_INDEX)
    }
}

impl TryFrom<LocateArgs> for LocateOptions {
    type Error = CliError;

    fn try_from(args: LocateArgs) -> Result<Self, Self::Error> {
        let index = args.index.ok_or(CliError::MissingArgument {
            field: ARG_LOCATE_INDEX,
            env: ENV_LOCATE_INDEX,
        })?;
        let lat = args.lat.ok_or(CliError::MissingArgument {
            field: ARG_LOCATE_LAT,
            env: ENV_LOCATE_LAT,
        })?;
        let lon = args.lon.ok_or(CliError::MissingArgument {
            field: ARG_LOCATE_LON,
            env: ENV_LOCATE_LON,
        })?;
        let defaults = SearchConfig::default();
        let search = SearchConfig {
            max_radius_km: args.max_radius_km.unwrap_or(defaults.max_radius_km),
            ..defaults
        };
        search.validate()?;
        Ok(Self {
            index,
            at: Coordinate::new(lat, lon)?,
            search,
        })
    }
}

fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match kerbside_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::MissingSourceFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// JSON body printed for a resolved position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct LocateReport {
    pub(crate) node: NodeId,
    pub(crate) distance_km: f64,
    pub(crate) at_intersection: bool,
    pub(crate) streets: Vec<Street>,
}

/// Resolve `at` against `index`, or `None` beyond the search cap.
pub(crate) fn locate<I: SpatialIndex>(
    resolver: &NearestNodeResolver<I>,
    at: Coordinate,
) -> Option<LocateReport> {
    let closest = resolver.find_closest(at)?;
    let graph = StreetGraph::new(resolver.index());
    Some(LocateReport {
        node: closest.id,
        distance_km: closest.distance_km,
        at_intersection: graph.is_intersection(closest.id),
        streets: graph.fetch_streets(closest.id),
    })
}

pub(crate) fn run_locate(args: LocateArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let options = args.into_options()?;
    options.validate_sources()?;
    let index = SqliteSpatialIndex::open(&options.index)?;
    let resolver = NearestNodeResolver::new(index, options.search)?;
    match locate(&resolver, options.at) {
        Some(report) => write_json(writer, &report),
        None => writeln!(writer, "{UNKNOWN_LOCATION}").map_err(CliError::WriteOutput),
    }
}

#[cfg(test)]
pub(crate) fn options_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<LocateOptions, CliError> {
    let merged = LocateArgs::merge_from_layers(layers).map_err(CliError::from)?;
    LocateOptions::try_from(merged)
}
