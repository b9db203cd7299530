//! Live location tracking.
//!
//! [`LocationTracker`] turns position fixes into street resolution events.
//! [`TrackerSession`] runs a tracker on a worker thread and drops fixes that
//! arrive while a resolution is still in flight.

use std::fmt;

use log::debug;

use crate::{NearestNodeResolver, NodeId, SpatialIndex, Street, StreetGraph};

mod fix;
mod session;

pub use fix::{PositionFix, STATIONARY_THRESHOLD_KMH};
pub use session::{FixDelivery, TrackerError, TrackerSession};

/// Street details shown to the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StreetReport {
    pub street_name: Option<String>,
    /// Effective limit in km/h.
    pub max_speed: u32,
    /// `false` when `max_speed` was inferred from the road class.
    pub speed_is_known: bool,
}

impl From<&Street> for StreetReport {
    fn from(street: &Street) -> Self {
        Self {
            street_name: street.name.clone(),
            max_speed: street.max_speed_kmh,
            speed_is_known: street.speed_is_known(),
        }
    }
}

impl fmt::Display for StreetReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.street_name.as_deref().unwrap_or("unnamed");
        if self.speed_is_known {
            write!(f, "{name} ({} km/h)", self.max_speed)
        } else {
            write!(f, "{name} ({} km/h, inferred)", self.max_speed)
        }
    }
}

/// Outcome of resolving one fix.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum ResolutionEvent {
    /// No indexed node lies within the search cap.
    UnknownLocation,
    /// The fix resolved to `node`.
    ///
    /// At an intersection `streets` repeats the street last reported away
    /// from an intersection.
    Located {
        node: NodeId,
        at_intersection: bool,
        streets: Vec<StreetReport>,
    },
}

/// Resolves fixes to streets, remembering the last street driven on.
#[derive(Debug)]
pub struct LocationTracker<I> {
    resolver: NearestNodeResolver<I>,
    last_known_node: Option<NodeId>,
    current_closest_node: Option<NodeId>,
}

impl<I: SpatialIndex> LocationTracker<I> {
    pub fn new(resolver: NearestNodeResolver<I>) -> Self {
        Self {
            resolver,
            last_known_node: None,
            current_closest_node: None,
        }
    }

    pub fn resolver(&self) -> &NearestNodeResolver<I> {
        &self.resolver
    }

    /// Most recent node resolved away from an intersection.
    pub fn last_known_node(&self) -> Option<NodeId> {
        self.last_known_node
    }

    /// Node the previous fix resolved to; cleared by an unknown location.
    pub fn current_closest_node(&self) -> Option<NodeId> {
        self.current_closest_node
    }

    /// Resolve one fix.
    ///
    /// Returns `None` when the fix resolves to the same node as the previous
    /// one, or reaches an intersection before any street is known.
    ///
    /// # Examples
    /// ```
    /// use kerbside_core::{
    ///     Coordinate, LocationTracker, NearestNodeResolver, PositionFix, ResolutionEvent,
    ///     test_support::MemoryIndex,
    /// };
    ///
    /// # fn main() -> Result<(), kerbside_core::CoordinateError> {
    /// let resolver = NearestNodeResolver::with_defaults(MemoryIndex::default());
    /// let mut tracker = LocationTracker::new(resolver);
    /// let fix = PositionFix::new(Coordinate::new(43.0, -79.0)?);
    /// assert_eq!(tracker.handle_fix(&fix), Some(ResolutionEvent::UnknownLocation));
    /// # Ok(())
    /// # }
    /// ```
    pub fn handle_fix(&mut self, fix: &PositionFix) -> Option<ResolutionEvent> {
        let Some(node) = self.resolver.find_closest_node(fix.coordinate()) else {
            self.current_closest_node = None;
            return Some(ResolutionEvent::UnknownLocation);
        };

        if self.current_closest_node == Some(node) {
            debug!("fix resolved to node {node} again; skipping street lookup");
            return None;
        }
        self.current_closest_node = Some(node);

        let graph = StreetGraph::new(self.resolver.index());
        if graph.is_intersection(node) {
            let Some(previous) = self.last_known_node else {
                debug!("reached intersection {node} before any street was known");
                return None;
            };
            debug!("at intersection {node}; keeping streets of node {previous}");
            return Some(ResolutionEvent::Located {
                node,
                at_intersection: true,
                streets: reports(&graph.fetch_streets(previous)),
            });
        }

        self.last_known_node = Some(node);
        Some(ResolutionEvent::Located {
            node,
            at_intersection: false,
            streets: reports(&graph.fetch_streets(node)),
        })
    }
}

fn reports(streets: &[Street]) -> Vec<StreetReport> {
    streets.iter().map(StreetReport::from).collect()
}
