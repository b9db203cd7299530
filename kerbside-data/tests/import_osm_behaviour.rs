//! Behavioural tests for the `import_osm` entry point.

use camino::Utf8PathBuf;
use kerbside_core::{SpatialIndex, SqliteSpatialIndex, StreetGraph};
use kerbside_data::{ImportConfig, ImportError, ImportReport, import_osm};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use tempfile::TempDir;

mod support;

use support::{entries, scratch_root, stage_fixture};

const EXISTING_CONTENTS: &str = "not an index";

struct ImportWorld {
    dir: TempDir,
    source: RefCell<Option<Utf8PathBuf>>,
    output: Utf8PathBuf,
    result: RefCell<Option<Result<ImportReport, ImportError>>>,
}

impl ImportWorld {
    fn import(&self) {
        let outcome = {
            let source = self.source.borrow();
            let source = source.as_ref().expect("source prepared");
            import_osm(source, &self.output, &ImportConfig::default())
        };
        self.result.replace(Some(outcome));
    }

    fn report(&self) -> ImportReport {
        self.result
            .borrow()
            .as_ref()
            .expect("import was attempted")
            .as_ref()
            .expect("expected a successful import")
            .clone()
    }

    fn error<T>(&self, inspect: impl FnOnce(&ImportError) -> T) -> T {
        let result = self.result.borrow();
        match result.as_ref().expect("import was attempted") {
            Ok(report) => panic!("expected the import to fail, got {report:?}"),
            Err(err) => inspect(err),
        }
    }

    fn source_name(&self) -> Option<String> {
        self.source
            .borrow()
            .as_ref()
            .and_then(|path| path.file_name().map(str::to_owned))
    }
}

#[fixture]
fn world() -> ImportWorld {
    let dir = TempDir::new().expect("create scratch directory");
    let output = scratch_root(&dir).join("index/toronto.db");
    ImportWorld {
        dir,
        source: RefCell::new(None),
        output,
        result: RefCell::new(None),
    }
}

#[given("the Toronto fixture extract")]
fn given_toronto(world: &ImportWorld) {
    let source = stage_fixture(&world.dir, "toronto.osm", "toronto.osm");
    world.source.replace(Some(source));
}

#[given("the destination index already exists")]
fn given_existing_output(world: &ImportWorld) {
    let output = scratch_root(&world.dir).join("toronto.db");
    std::fs::write(&output, EXISTING_CONTENTS).expect("write existing destination");
}

#[given("a path to a missing extract")]
fn given_missing(world: &ImportWorld) {
    world
        .source
        .replace(Some(scratch_root(&world.dir).join("missing.osm")));
}

#[given("an extract whose second line lacks the OSM root")]
fn given_headerless(world: &ImportWorld) {
    let source = stage_fixture(&world.dir, "headerless.osm", "headerless.osm");
    world.source.replace(Some(source));
}

#[given("the Toronto fixture extract saved with an upper-case extension")]
fn given_upper_case(world: &ImportWorld) {
    let source = stage_fixture(&world.dir, "toronto.osm", "toronto.OSM");
    world.source.replace(Some(source));
}

#[when("I import it into a fresh index")]
fn when_import(world: &ImportWorld) {
    world.import();
}

#[when("I import it into the existing destination")]
fn when_import_existing(world: &ImportWorld) {
    let output = scratch_root(&world.dir).join("toronto.db");
    let outcome = {
        let source = world.source.borrow();
        let source = source.as_ref().expect("source prepared");
        import_osm(source, &output, &ImportConfig::default())
    };
    world.result.replace(Some(outcome));
}

#[then("the report counts two kept ways and two filtered ways")]
fn then_way_counts(world: &ImportWorld) {
    let report = world.report();
    assert_eq!(report.ways_read, 5);
    assert_eq!(report.ways_kept, 2);
    assert_eq!(report.ways_filtered, 2);
}

#[then("the duplicate node and way are counted")]
fn then_duplicates(world: &ImportWorld) {
    let report = world.report();
    assert_eq!(report.nodes_read, 7);
    assert_eq!(report.duplicate_nodes, 1);
    assert_eq!(report.duplicate_ways, 1);
    assert_eq!(report.invalid_nodes, 0);
}

#[then("the nodes outside kept streets are pruned")]
fn then_pruned(world: &ImportWorld) {
    let report = world.report();
    assert_eq!(report.nodes_pruned, 2);
    assert_eq!(report.nodes_retained, 4);
    let bounds = report.bounds.expect("retained nodes have bounds");
    assert_eq!((bounds.min().x, bounds.min().y), (-79.001, 43.0));
    assert_eq!((bounds.max().x, bounds.max().y), (-79.0, 43.001));

    let index = SqliteSpatialIndex::open(&world.output).expect("open imported index");
    assert_eq!(index.node_count(), 4);
    assert_eq!(index.way_count(), 2);
    assert!(index.street_attributes(300).is_none(), "path way was stored");
    assert!(index.street_attributes(400).is_none(), "building way was stored");
    let graph = StreetGraph::new(&index);
    assert!(graph.node_coordinates(5).is_none(), "path-only node survived");
    assert!(graph.node_coordinates(6).is_none(), "building node survived");
    let first = graph.node_coordinates(2).expect("node 2 kept");
    assert_eq!(first.lat(), 43.0005, "first copy of node 2 wins");
}

#[then("King St is stored as a oneway street limited to 40 km/h")]
fn then_king_street(world: &ImportWorld) {
    let index = SqliteSpatialIndex::open(&world.output).expect("open imported index");
    let graph = StreetGraph::new(&index);
    assert!(graph.is_intersection(3));
    assert!(!graph.is_intersection(1));

    let streets = graph.fetch_streets(4);
    let [king] = streets.as_slice() else {
        panic!("expected one street at node 4, got {streets:?}");
    };
    assert_eq!(king.name.as_deref(), Some("King St"));
    assert!(king.oneway);
    assert_eq!(king.lanes, 2);
    assert_eq!(king.max_speed_kmh, 40);
    assert!(king.speed_is_known());
}

#[then("the import fails because the output exists")]
fn then_output_exists(world: &ImportWorld) {
    world.error(|err| assert!(matches!(err, ImportError::OutputExists { .. }), "{err:?}"));
}

#[then("the existing destination is untouched")]
fn then_untouched(world: &ImportWorld) {
    let output = scratch_root(&world.dir).join("toronto.db");
    let contents = std::fs::read_to_string(output).expect("read destination");
    assert_eq!(contents, EXISTING_CONTENTS);
    assert_eq!(entries(&world.dir), vec!["toronto.db", "toronto.osm"]);
}

#[then("the import fails because the source is missing")]
fn then_missing(world: &ImportWorld) {
    world.error(|err| assert!(matches!(err, ImportError::MissingSource { .. }), "{err:?}"));
}

#[then("the import fails because the source is invalid")]
fn then_invalid(world: &ImportWorld) {
    world.error(|err| assert!(matches!(err, ImportError::InvalidSource { .. }), "{err:?}"));
}

#[then("the import fails because the extension is unexpected")]
fn then_extension(world: &ImportWorld) {
    world.error(|err| {
        assert!(
            matches!(err, ImportError::UnexpectedExtension { .. }),
            "{err:?}"
        );
    });
}

#[then("no index is written")]
fn then_nothing_written(world: &ImportWorld) {
    assert!(!world.output.exists(), "destination was created");
    let expected: Vec<String> = world
        .source_name()
        .filter(|name| scratch_root(&world.dir).join(name).exists())
        .into_iter()
        .collect();
    assert_eq!(entries(&world.dir), expected, "unexpected files left behind");
}

#[test]
fn scenario_indices_follow_feature_order() {
    support::assert_scenario_order(
        "tests/features/import_osm.feature",
        &[
            "importing a small street network",
            "refusing to overwrite an existing index",
            "refusing a missing extract",
            "refusing a file without an OSM root on its second line",
            "refusing an extract with an upper-case extension",
        ],
    );
}

#[scenario(path = "tests/features/import_osm.feature", index = 0)]
fn importing_street_network(world: ImportWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/import_osm.feature", index = 1)]
fn refusing_existing_output(world: ImportWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/import_osm.feature", index = 2)]
fn refusing_missing_source(world: ImportWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/import_osm.feature", index = 3)]
fn refusing_headerless_source(world: ImportWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/import_osm.feature", index = 4)]
fn refusing_upper_case_extension(world: ImportWorld) {
    let _ = world;
}
