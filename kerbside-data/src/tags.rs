//! Street attributes derived from way tags.
//!
//! `0` stands for "unknown" in both the lane count and the declared speed.

use std::collections::BTreeMap;

use kerbside_core::{RoadClass, StreetAttributes, WayId};
use log::warn;

/// Micro-kilometres per mile.
const MICRO_KM_PER_MILE: u64 = 1_609_344;

/// Road class from the `highway` tag, if present.
pub(crate) fn road_class(tags: &BTreeMap<String, String>) -> Option<RoadClass> {
    tags.get("highway").map(|value| RoadClass::from(value.as_str()))
}

pub(crate) fn street_attributes(
    way_id: WayId,
    road_class: RoadClass,
    tags: &BTreeMap<String, String>,
) -> StreetAttributes {
    StreetAttributes {
        way_id,
        name: tags.get("name").filter(|name| !name.is_empty()).cloned(),
        lanes: tags.get("lanes").map_or(0, |value| parse_lanes(way_id, value)),
        declared_speed_kmh: tags
            .get("maxspeed")
            .map_or(0, |value| parse_maxspeed(way_id, value)),
        road_class,
        oneway: tags.get("oneway").is_some_and(|value| value == "yes"),
    }
}

fn parse_lanes(way_id: WayId, value: &str) -> u32 {
    value.trim().parse().unwrap_or_else(|_| {
        warn!("way {way_id} has unparseable lanes {value:?}; storing as unknown");
        0
    })
}

/// Parse `maxspeed` into km/h, converting an `mph` suffix.
fn parse_maxspeed(way_id: WayId, value: &str) -> u32 {
    let trimmed = value.trim();
    let parsed = match trimmed.strip_suffix("mph") {
        Some(miles) => miles.trim().parse::<u32>().ok().and_then(mph_to_kmh),
        None => trimmed.parse::<u32>().ok(),
    };
    parsed.unwrap_or_else(|| {
        warn!("way {way_id} has unsupported maxspeed {value:?}; storing as unknown");
        0
    })
}

fn mph_to_kmh(mph: u32) -> Option<u32> {
    let micro_km = u64::from(mph) * MICRO_KM_PER_MILE;
    u32::try_from((micro_km + 500_000) / 1_000_000).ok()
}
