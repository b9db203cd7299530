//! `import` command: build a spatial index from an OSM XML extract.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use kerbside_core::RoadClass;
use kerbside_data::{ImportConfig, import_osm};
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_IMPORT_OSM, ARG_IMPORT_OUTPUT, CliError, ENV_IMPORT_OSM, ENV_IMPORT_OUTPUT, write_json,
};

/// CLI arguments for the `import` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Build a spatial index from an OpenStreetMap XML extract. \
                 Only ways whose highway tag is a routable road class are \
                 kept, and nodes outside those ways are pruned. The output \
                 file must not exist yet.",
    about = "Import an OSM XML extract into a spatial index"
)]
#[ortho_config(prefix = "KERBSIDE")]
pub(crate) struct ImportArgs {
    /// Path to the OpenStreetMap XML extract (`.osm`).
    #[arg(long = ARG_IMPORT_OSM, value_name = "path")]
    #[serde(default)]
    pub(crate) osm: Option<Utf8PathBuf>,
    /// Path of the SQLite index to create.
    #[arg(long = ARG_IMPORT_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Keep only these highway classes; repeat for several. Defaults to
    /// every routable class.
    #[arg(long = "road-class", value_name = "class")]
    #[serde(default)]
    pub(crate) road_class: Vec<String>,
}

impl ImportArgs {
    pub(crate) fn into_options(self) -> Result<ImportOptions, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ImportOptions::try_from(merged)
    }
}

/// Resolved `import` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportOptions {
    pub(crate) osm: Utf8PathBuf,
    pub(crate) output: Utf8PathBuf,
    pub(crate) import: ImportConfig,
}

impl TryFrom<ImportArgs> for ImportOptions {
    type Error = CliError;

    fn try_from(args: ImportArgs) -> Result<Self, Self::Error> {
        let osm = args.osm.ok_or(CliError::MissingArgument {
            field: ARG_IMPORT_OSM,
            env: ENV_IMPORT_OSM,
        })?;
        let output = args.output.ok_or(CliError::MissingArgument {
            field: ARG_IMPORT_OUTPUT,
            env: ENV_IMPORT_OUTPUT,
        })?;
        let import = if args.road_class.is_empty() {
            ImportConfig::default()
        } else {
            ImportConfig {
                road_classes: args.road_class.into_iter().map(RoadClass::from).collect(),
            }
        };
        Ok(Self {
            osm,
            output,
            import,
        })
    }
}

pub(crate) fn run_import(args: ImportArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let options = args.into_options()?;
    let report = import_osm(&options.osm, &options.output, &options.import)?;
    info!("{} successfully created", options.output);
    write_json(writer, &report)
}

#[cfg(test)]
pub(crate) fn options_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<ImportOptions, CliError> {
    let merged = ImportArgs::merge_from_layers(layers).map_err(CliError::from)?;
    ImportOptions::try_from(merged)
}
