//! One-shot import of an OSM XML extract into a spatial index file.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use kerbside_core::{Coordinate, NodeId, WayId};
use log::{debug, info, warn};
use rusqlite::Connection;
use tempfile::NamedTempFile;

use crate::{
    ImportConfig, ImportError, ImportReport, OsmElement, OsmXmlReader,
    sqlite::{self, IndexWriter, Inserted},
    tags, validate,
};

/// Build a spatial index at `output` from the OSM XML extract at `source`.
///
/// The index is staged beside `output` and moved into place only after the
/// transaction commits and the connection closes. Nothing is left behind on
/// failure, and an `output` that appears while importing is not replaced.
///
/// # Examples
/// ```no_run
/// use camino::Utf8Path;
/// use kerbside_data::{ImportConfig, import_osm};
///
/// # fn main() -> Result<(), kerbside_data::ImportError> {
/// let report = import_osm(
///     Utf8Path::new("toronto.osm"),
///     Utf8Path::new("toronto.db"),
///     &ImportConfig::default(),
/// )?;
/// println!("kept {} ways", report.ways_kept);
/// # Ok(())
/// # }
/// ```
pub fn import_osm(
    source: &Utf8Path,
    output: &Utf8Path,
    config: &ImportConfig,
) -> Result<ImportReport, ImportError> {
    validate::check_paths(source, output)?;
    info!("importing OSM extract {source} into {output}");
    let elements = OsmXmlReader::from_path(source)?;

    let directory = kerbside_fs::parent_or_current(output);
    kerbside_fs::ensure_parent_dir(output).map_err(|source| ImportError::Stage {
        path: directory.to_path_buf(),
        source,
    })?;
    let staged = NamedTempFile::new_in(directory).map_err(|source| ImportError::Stage {
        path: directory.to_path_buf(),
        source,
    })?;
    let staged_path = staged_path(directory, &staged);

    let mut connection =
        Connection::open(staged.path()).map_err(|source| ImportError::Open {
            path: staged_path.clone(),
            source,
        })?;
    let report = write_index(&mut connection, elements, config)?;
    connection
        .close()
        .map_err(|(_, source)| ImportError::Close {
            path: staged_path,
            source,
        })?;

    staged
        .persist_noclobber(output.as_std_path())
        .map_err(|err| match err.error.kind() {
            std::io::ErrorKind::AlreadyExists => ImportError::OutputExists {
                path: output.to_path_buf(),
            },
            _ => ImportError::Persist {
                path: output.to_path_buf(),
                source: err.error,
            },
        })?;
    info!(
        "wrote {output}: {} ways, {} nodes",
        report.ways_kept, report.nodes_retained
    );
    Ok(report)
}

/// Write `elements` into a fresh index schema on `connection` inside one
/// transaction, then prune nodes that no kept way references.
///
/// The connection must not already hold the index tables.
pub fn write_index<I>(
    connection: &mut Connection,
    elements: I,
    config: &ImportConfig,
) -> Result<ImportReport, ImportError>
where
    I: IntoIterator<Item = Result<OsmElement, ImportError>>,
{
    let transaction = connection
        .transaction()
        .map_err(|source| ImportError::BeginTransaction { source })?;
    sqlite::create_schema(&transaction)?;

    let mut report = {
        let mut importer = Importer {
            writer: IndexWriter::prepare(&transaction)?,
            config,
            report: ImportReport::default(),
        };
        for element in elements {
            match element? {
                OsmElement::Node { id, lat, lon } => importer.node(id, lat, lon)?,
                OsmElement::Way { id, tags, refs } => importer.way(id, &tags, &refs)?,
            }
        }
        importer.report
    };
    info!(
        "read {} nodes and {} ways; kept {} ways, filtered {}",
        report.nodes_read, report.ways_read, report.ways_kept, report.ways_filtered
    );

    report.nodes_pruned = sqlite::prune_orphans(&transaction)?;
    let (retained, bounds) = sqlite::summarise_nodes(&transaction)?;
    report.nodes_retained = retained;
    report.bounds = bounds;
    info!(
        "pruned {} orphan nodes; {} nodes retained",
        report.nodes_pruned, report.nodes_retained
    );

    transaction
        .commit()
        .map_err(|source| ImportError::Commit { source })?;
    Ok(report)
}

struct Importer<'a, 'tx> {
    writer: IndexWriter<'tx>,
    config: &'a ImportConfig,
    report: ImportReport,
}

impl Importer<'_, '_> {
    fn node(&mut self, id: NodeId, lat: f64, lon: f64) -> Result<(), ImportError> {
        self.report.nodes_read += 1;
        let coordinate = match Coordinate::new(lat, lon) {
            Ok(coordinate) => coordinate,
            Err(err) => {
                warn!("skipping node {id}: {err}");
                self.report.invalid_nodes += 1;
                return Ok(());
            }
        };
        if self.writer.node(id, coordinate)? == Inserted::Duplicate {
            warn!("skipping duplicate node {id}");
            self.report.duplicate_nodes += 1;
        }
        Ok(())
    }

    fn way(
        &mut self,
        id: WayId,
        way_tags: &BTreeMap<String, String>,
        refs: &[NodeId],
    ) -> Result<(), ImportError> {
        self.report.ways_read += 1;
        let Some(road_class) = tags::road_class(way_tags).filter(|class| self.config.keeps(class))
        else {
            debug!("filtering way {id}: highway tag {:?}", way_tags.get("highway"));
            self.report.ways_filtered += 1;
            return Ok(());
        };

        let attributes = tags::street_attributes(id, road_class, way_tags);
        match self.writer.way(&attributes, refs)? {
            Inserted::Fresh => self.report.ways_kept += 1,
            Inserted::Duplicate => {
                warn!("skipping duplicate way {id}");
                self.report.duplicate_ways += 1;
            }
        }
        Ok(())
    }
}

fn staged_path(directory: &Utf8Path, staged: &NamedTempFile) -> Utf8PathBuf {
    let name = staged
        .path()
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    directory.join(name)
}
