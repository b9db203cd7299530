//! Import tunables.

use std::collections::BTreeSet;

use kerbside_core::RoadClass;

/// Settings for one import run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ImportConfig {
    /// Ways whose `highway` tag is not listed here are dropped.
    pub road_classes: BTreeSet<RoadClass>,
}

impl ImportConfig {
    /// Whether a way tagged `highway = road_class` should be kept.
    pub fn keeps(&self, road_class: &RoadClass) -> bool {
        self.road_classes.contains(road_class)
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            road_classes: RoadClass::routable().into_iter().collect(),
        }
    }
}
