#![allow(dead_code, reason = "each integration test uses a different subset")]

use camino::Utf8PathBuf;
use std::path::PathBuf;
use tempfile::TempDir;

/// Directory containing the OSM XML fixtures.
pub fn fixtures_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Copy fixture `name` into `dir` as `target`, returning the copy's path.
pub fn stage_fixture(dir: &TempDir, name: &str, target: &str) -> Utf8PathBuf {
    let destination = scratch_root(dir).join(target);
    std::fs::copy(fixtures_dir().join(name), &destination).unwrap_or_else(|err| {
        panic!("failed to copy fixture {name} to {destination}: {err}");
    });
    destination
}

pub fn scratch_root(dir: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
        .unwrap_or_else(|path: PathBuf| panic!("temp dir {path:?} is not UTF-8"))
}

/// File names left in `dir`, sorted.
pub fn entries(dir: &TempDir) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir.path())
        .expect("list scratch directory")
        .map(|entry| {
            entry
                .expect("read directory entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}

pub fn assert_scenario_order(feature: &str, expected: &[&str]) {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(feature);
    let contents = std::fs::read_to_string(&path).unwrap_or_else(|err| {
        panic!("failed to read feature file {path:?}: {err}");
    });
    let titles: Vec<&str> = contents
        .lines()
        .filter_map(|line| line.trim().strip_prefix("Scenario: "))
        .collect();
    assert_eq!(titles, expected, "scenario order changed in {feature}");
}
