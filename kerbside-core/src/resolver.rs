//! Expanding-radius nearest-node search.

use log::debug;
use thiserror::Error;

use crate::{
    Coordinate, EARTH_RADIUS_KM, IndexedNode, NodeId, SpatialIndex, create_box_with_radius,
    distance_between_with_radius,
};

/// Tunables for [`NearestNodeResolver`].
///
/// The defaults start at 20 m and grow the box by 5 m per round up to 1 km,
/// which bounds a search at 197 range queries.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchConfig {
    /// Radius of the first search box, in kilometres.
    pub start_radius_km: f64,
    /// Growth of the radius between rounds, in kilometres.
    pub radius_step_km: f64,
    /// Largest radius tried before giving up, in kilometres.
    pub max_radius_km: f64,
    /// Sphere radius used for boxes and distances.
    pub earth_radius_km: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            start_radius_km: 0.020,
            radius_step_km: 0.005,
            max_radius_km: 1.00,
            earth_radius_km: EARTH_RADIUS_KM,
        }
    }
}

/// Errors raised by [`SearchConfig::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchConfigError {
    /// The first search radius was zero, negative or not finite.
    #[error("start radius must be positive, got {value} km")]
    NonPositiveStart { value: f64 },
    /// The per-round increment was zero, negative or not finite.
    #[error("radius step must be positive, got {value} km")]
    NonPositiveStep { value: f64 },
    /// The cap was below the first radius.
    #[error("maximum radius {max} km is below the start radius {start} km")]
    MaxBelowStart { start: f64, max: f64 },
    /// The sphere radius was zero, negative or not finite.
    #[error("earth radius must be positive, got {value} km")]
    NonPositiveEarthRadius { value: f64 },
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

impl SearchConfig {
    /// Check every tunable.
    pub fn validate(&self) -> Result<(), SearchConfigError> {
        if !positive(self.start_radius_km) {
            return Err(SearchConfigError::NonPositiveStart {
                value: self.start_radius_km,
            });
        }
        if !positive(self.radius_step_km) {
            return Err(SearchConfigError::NonPositiveStep {
                value: self.radius_step_km,
            });
        }
        if !self.max_radius_km.is_finite() || self.max_radius_km < self.start_radius_km {
            return Err(SearchConfigError::MaxBelowStart {
                start: self.start_radius_km,
                max: self.max_radius_km,
            });
        }
        if !positive(self.earth_radius_km) {
            return Err(SearchConfigError::NonPositiveEarthRadius {
                value: self.earth_radius_km,
            });
        }
        Ok(())
    }

    /// Number of range queries a fruitless search performs.
    ///
    /// Radii are derived from an integer round counter, so accumulated
    /// floating-point error never adds or skips a round.
    ///
    /// # Examples
    /// ```
    /// use kerbside_core::SearchConfig;
    ///
    /// assert_eq!(SearchConfig::default().rounds(), 197);
    /// ```
    pub fn rounds(&self) -> u32 {
        let steps = ((self.max_radius_km - self.start_radius_km) / self.radius_step_km + 1.0e-9)
            .floor()
            .max(0.0);
        // Validated configs keep `steps` finite and non-negative.
        let steps = steps.min(f64::from(u32::MAX - 1)) as u32;
        steps + 1
    }

    fn radius_for_round(&self, round: u32) -> f64 {
        self.start_radius_km + f64::from(round) * self.radius_step_km
    }
}

/// The node chosen by a search, with how it was found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestNode {
    /// Id of the winning node.
    pub id: NodeId,
    /// Stored coordinate of the winning node.
    pub coordinate: Coordinate,
    /// Great-circle distance from the query point, in kilometres.
    pub distance_km: f64,
    /// Radius of the box that first produced candidates, in kilometres.
    pub radius_km: f64,
}

/// Finds the indexed node nearest to a coordinate.
///
/// # Examples
/// ```
/// use kerbside_core::{Coordinate, NearestNodeResolver, test_support::MemoryIndex};
///
/// # fn main() -> Result<(), kerbside_core::CoordinateError> {
/// let index = MemoryIndex::default()
///     .with_node(1, Coordinate::new(43.0, -79.0)?)
///     .with_node(2, Coordinate::new(43.0005, -79.0)?);
/// let resolver = NearestNodeResolver::with_defaults(index);
/// assert_eq!(resolver.find_closest_node(Coordinate::new(43.00001, -79.0)?), Some(1));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct NearestNodeResolver<I> {
    index: I,
    config: SearchConfig,
}

impl<I: SpatialIndex> NearestNodeResolver<I> {
    /// Build a resolver after validating `config`.
    pub fn new(index: I, config: SearchConfig) -> Result<Self, SearchConfigError> {
        config.validate()?;
        Ok(Self { index, config })
    }

    /// Build a resolver using [`SearchConfig::default`].
    pub fn with_defaults(index: I) -> Self {
        Self {
            index,
            config: SearchConfig::default(),
        }
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Identifier of the nearest node within the maximum radius.
    pub fn find_closest_node(&self, at: Coordinate) -> Option<NodeId> {
        self.find_closest(at).map(|closest| closest.id)
    }

    /// Nearest node within the maximum radius, with its distance.
    ///
    /// Candidates are compared in ascending id order and only a strictly
    /// shorter distance replaces the current best, so the lowest id wins ties.
    pub fn find_closest(&self, at: Coordinate) -> Option<ClosestNode> {
        let config = &self.config;
        for round in 0..config.rounds() {
            let radius_km = config.radius_for_round(round);
            let search = create_box_with_radius(radius_km, at, config.earth_radius_km).ok()?;

            let mut candidates: Vec<IndexedNode> = search
                .rects()
                .iter()
                .flat_map(|rect| self.index.nodes_in_box(rect))
                .collect();
            if candidates.is_empty() {
                continue;
            }
            candidates.sort_unstable_by_key(|node| node.id);
            candidates.dedup_by_key(|node| node.id);

            let mut best: Option<ClosestNode> = None;
            for node in candidates {
                let distance_km =
                    distance_between_with_radius(at, node.coordinate, config.earth_radius_km);
                if best.is_none_or(|current| distance_km < current.distance_km) {
                    best = Some(ClosestNode {
                        id: node.id,
                        coordinate: node.coordinate,
                        distance_km,
                        radius_km,
                    });
                }
            }
            if let Some(closest) = best {
                debug!(
                    "resolved ({}, {}) to node {} at {:.4} km after {} round(s)",
                    at.lat(),
                    at.lon(),
                    closest.id,
                    closest.distance_km,
                    round + 1
                );
            }
            return best;
        }

        debug!(
            "no node within {} km of ({}, {})",
            config.max_radius_km,
            at.lat(),
            at.lon()
        );
        None
    }
}
