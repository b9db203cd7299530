//! Position fixes delivered by the positioning sensor.

use crate::{Coordinate, Heading};

/// Speeds at or below this value, in km/h, are reported as stationary.
pub const STATIONARY_THRESHOLD_KMH: u32 = 2;

/// One reading from the positioning sensor.
///
/// # Examples
/// ```
/// use kerbside_core::{Coordinate, Heading, PositionFix};
///
/// # fn main() -> Result<(), kerbside_core::CoordinateError> {
/// let fix = PositionFix::new(Coordinate::new(43.0, -79.0)?)
///     .with_speed_mps(13.9)
///     .with_bearing(91.0);
/// assert_eq!(fix.speed_kmh(), Some(50));
/// assert_eq!(fix.heading(), Some(Heading::Eastbound));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionFix {
    coordinate: Coordinate,
    speed_kmh: Option<u32>,
    bearing: Option<f64>,
}

impl PositionFix {
    pub const fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            speed_kmh: None,
            bearing: None,
        }
    }

    /// Attach a speed reported in metres per second.
    ///
    /// The value is converted to whole km/h. Readings at or below
    /// [`STATIONARY_THRESHOLD_KMH`] become `0` to hide sensor jitter while
    /// parked. Negative or non-finite readings are discarded.
    #[must_use]
    pub fn with_speed_mps(mut self, metres_per_second: f64) -> Self {
        let kmh = (metres_per_second * 3.6).round();
        self.speed_kmh = if !kmh.is_finite() || kmh < 0.0 {
            None
        } else if kmh <= f64::from(STATIONARY_THRESHOLD_KMH) {
            Some(0)
        } else {
            Some(kmh.min(f64::from(u32::MAX)) as u32)
        };
        self
    }

    /// Attach a travel bearing in degrees. Non-finite bearings are discarded.
    #[must_use]
    pub fn with_bearing(mut self, bearing: f64) -> Self {
        self.bearing = bearing.is_finite().then(|| bearing.rem_euclid(360.0));
        self
    }

    pub const fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    pub const fn speed_kmh(&self) -> Option<u32> {
        self.speed_kmh
    }

    pub const fn bearing(&self) -> Option<f64> {
        self.bearing
    }

    /// Compass octant of the bearing, when one was reported.
    pub fn heading(&self) -> Option<Heading> {
        self.bearing.map(Heading::from_bearing)
    }
}

impl From<Coordinate> for PositionFix {
    fn from(coordinate: Coordinate) -> Self {
        Self::new(coordinate)
    }
}
