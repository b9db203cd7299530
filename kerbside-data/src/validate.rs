//! Pre-flight checks run before anything is written.

use std::io::{self, BufRead, BufReader};

use camino::Utf8Path;
use kerbside_fs::{file_is_file, open_utf8_file, path_exists};

use crate::ImportError;

/// Extension the importer accepts, compared case-sensitively.
pub const OSM_EXTENSION: &str = "osm";

/// Refuse the run unless `output` is free and `source` looks like an OSM
/// XML extract.
///
/// Checks run in order: destination free, source present, second line holds
/// the `<osm ... version` root marker, `.osm` extension.
pub fn check_paths(source: &Utf8Path, output: &Utf8Path) -> Result<(), ImportError> {
    if path_exists(output).map_err(inspect(output))? {
        return Err(ImportError::OutputExists {
            path: output.to_path_buf(),
        });
    }
    if !file_is_file(source).map_err(inspect(source))? {
        return Err(ImportError::MissingSource {
            path: source.to_path_buf(),
        });
    }

    let file = open_utf8_file(source).map_err(inspect(source))?;
    if !declares_osm_root(BufReader::new(file)).map_err(inspect(source))? {
        return Err(ImportError::InvalidSource {
            path: source.to_path_buf(),
        });
    }
    if source.extension() != Some(OSM_EXTENSION) {
        return Err(ImportError::UnexpectedExtension {
            path: source.to_path_buf(),
        });
    }
    Ok(())
}

/// Shallow sanity check: the second line must mention `<osm` and `version`.
pub(crate) fn declares_osm_root<R: BufRead>(reader: R) -> io::Result<bool> {
    let Some(line) = reader.split(b'\n').nth(1) else {
        return Ok(false);
    };
    let line = String::from_utf8_lossy(&line?).into_owned();
    Ok(line.contains("<osm") && line.contains("version"))
}

fn inspect(path: &Utf8Path) -> impl FnOnce(io::Error) -> ImportError + '_ {
    move |source| ImportError::InspectSource {
        path: path.to_path_buf(),
        source,
    }
}
