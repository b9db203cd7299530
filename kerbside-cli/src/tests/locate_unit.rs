//! Focused unit tests covering locate CLI configuration and output.

use super::helpers::{Scratch, crossing, invoke};
use super::*;
use crate::locate::{LocateOptions, UNKNOWN_LOCATION, locate, options_from_layers_for_test};
use kerbside_core::{CoordinateError, NearestNodeResolver, SearchConfig, SearchConfigError};
use ortho_config::MergeComposer;
use rstest::rstest;
use serde_json::json;

fn args(index: Option<&str>, lat: Option<f64>, lon: Option<f64>) -> LocateArgs {
    LocateArgs {
        index: index.map(Into::into),
        lat,
        lon,
        max_radius_km: None,
    }
}

#[rstest]
#[case(args(None, Some(43.0), Some(-79.0)), ARG_LOCATE_INDEX, ENV_LOCATE_INDEX)]
#[case(args(Some("index.db"), None, Some(-79.0)), ARG_LOCATE_LAT, ENV_LOCATE_LAT)]
#[case(args(Some("index.db"), Some(43.0), None), ARG_LOCATE_LON, ENV_LOCATE_LON)]
fn converting_without_required_fields_errors(
    #[case] input: LocateArgs,
    #[case] field: &'static str,
    #[case] env_var: &'static str,
) {
    let err = LocateOptions::try_from(input).expect_err("missing field should error");
    match err {
        CliError::MissingArgument {
            field: missing,
            env,
        } => {
            assert_eq!(missing, field);
            assert_eq!(env, env_var);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn out_of_range_latitude_is_rejected() {
    let err = LocateOptions::try_from(args(Some("index.db"), Some(91.0), Some(0.0)))
        .expect_err("latitude beyond the pole");
    assert!(matches!(
        err,
        CliError::InvalidCoordinate(CoordinateError::LatitudeOutOfRange { .. })
    ));
}

#[rstest]
fn search_cap_below_start_radius_is_rejected() {
    let input = LocateArgs {
        max_radius_km: Some(0.001),
        ..args(Some("index.db"), Some(43.0), Some(-79.0))
    };
    let err = LocateOptions::try_from(input).expect_err("cap below the start radius");
    assert!(matches!(
        err,
        CliError::InvalidSearch(SearchConfigError::MaxBelowStart { .. })
    ));
}

#[rstest]
fn search_cap_override_keeps_other_defaults() {
    let input = LocateArgs {
        max_radius_km: Some(2.5),
        ..args(Some("index.db"), Some(43.0), Some(-79.0))
    };
    let options = LocateOptions::try_from(input).expect("options should build");
    assert_eq!(
        options.search,
        SearchConfig {
            max_radius_km: 2.5,
            ..SearchConfig::default()
        }
    );
}

#[rstest]
fn environment_layer_supplies_the_index() {
    let mut composer = MergeComposer::new();
    composer.push_environment(json!({ "index": "from-env.db" }));
    composer.push_cli(json!({ "lat": 43.0, "lon": -79.0 }));

    let options =
        options_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(options.index, "from-env.db");
    assert_eq!(options.at.lat(), 43.0);
}

#[rstest]
fn validate_sources_reports_missing_index() {
    let scratch = Scratch::new();
    let options = LocateOptions::try_from(args(
        Some(scratch.root.join("missing.db").as_str()),
        Some(43.0),
        Some(-79.0),
    ))
    .expect("options should build");
    let err = options.validate_sources().expect_err("index is missing");
    match err {
        CliError::MissingSourceFile { field, .. } => assert_eq!(field, ARG_LOCATE_INDEX),
        other => panic!("unexpected error {other:?}"),
    }
}

#[rstest]
fn locate_reports_the_intersection_and_both_streets() {
    let resolver = NearestNodeResolver::with_defaults(crossing());
    let at = kerbside_core::Coordinate::new(43.00099, -79.0).expect("valid coordinate");
    let report = locate(&resolver, at).expect("node 3 is close by");
    assert_eq!(report.node, 3);
    assert!(report.at_intersection);
    let names: Vec<_> = report.streets.iter().map(|street| street.display_name()).collect();
    assert_eq!(names, vec!["Main St", "King St"]);
}

#[rstest]
fn locate_prints_json_for_a_known_position() {
    let scratch = Scratch::new();
    let index = scratch.crossing_index();
    let printed = invoke(&[
        "locate",
        "--index",
        index.as_str(),
        "--lat",
        "43.00001",
        "--lon",
        "-79.0",
    ])
    .expect("locate succeeds");
    let report: serde_json::Value = serde_json::from_str(&printed).expect("report is JSON");
    assert_eq!(report["node"], 1);
    assert_eq!(report["at_intersection"], false);
    assert_eq!(report["streets"][0]["name"], "Main St");
    assert_eq!(report["streets"][0]["max_speed_kmh"], 50);
}

#[rstest]
fn locate_prints_unknown_location_beyond_the_cap() {
    let scratch = Scratch::new();
    let index = scratch.crossing_index();
    let printed = invoke(&[
        "locate",
        "--index",
        index.as_str(),
        "--lat",
        "43.05",
        "--lon",
        "-79.0",
    ])
    .expect("locate succeeds");
    assert_eq!(printed.trim_end(), UNKNOWN_LOCATION);
}
