//! Command-line interface for kerbside's offline tooling.
#![forbid(unsafe_code)]

use std::io::Write;

use clap::{Parser, Subcommand};
use serde::Serialize;

mod error;
mod import;
mod locate;

pub use error::CliError;

use import::{ImportArgs, run_import};
use locate::{LocateArgs, run_locate};

const ARG_IMPORT_OSM: &str = "osm";
const ARG_IMPORT_OUTPUT: &str = "output";
const ARG_LOCATE_INDEX: &str = "index";
const ARG_LOCATE_LAT: &str = "lat";
const ARG_LOCATE_LON: &str = "lon";
const ENV_IMPORT_OSM: &str = "KERBSIDE_CMDS_IMPORT_OSM";
const ENV_IMPORT_OUTPUT: &str = "KERBSIDE_CMDS_IMPORT_OUTPUT";
const ENV_LOCATE_INDEX: &str = "KERBSIDE_CMDS_LOCATE_INDEX";
const ENV_LOCATE_LAT: &str = "KERBSIDE_CMDS_LOCATE_LAT";
const ENV_LOCATE_LON: &str = "KERBSIDE_CMDS_LOCATE_LON";

/// Run the kerbside CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    run_with(cli, &mut stdout)
}

fn run_with(cli: Cli, writer: &mut dyn Write) -> Result<(), CliError> {
    match cli.command {
        Command::Import(args) => run_import(args, writer),
        Command::Locate(args) => run_locate(args, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "kerbside",
    about = "Offline tooling for kerbside street-awareness indexes",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build a spatial index from an OSM XML extract.
    Import(ImportArgs),
    /// Resolve a position against a spatial index.
    Locate(LocateArgs),
}

fn write_json<T: Serialize>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerializeOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
mod tests;
