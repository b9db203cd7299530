//! Spherical geodesy helpers used by the nearest-node search.
//!
//! All functions are pure. Inputs are degree-valued [`Coordinate`]s and the
//! calculations run in radians on a sphere of radius [`EARTH_RADIUS_KM`]
//! unless a `_with_radius` variant is used.

use std::f64::consts::{FRAC_PI_4, PI, TAU};
use std::fmt;

use geo::{Coord, Rect};
use thiserror::Error;

use crate::Coordinate;

/// Mean equatorial radius used for every distance calculation, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6378.1;

/// Half-angle of the default field-of-vision cone, in degrees.
pub const DEFAULT_FIELD_OF_VISION_DEGREES: f64 = 45.0;

const MIN_LAT: f64 = -90.0;
const MAX_LAT: f64 = 90.0;
const MIN_LON: f64 = -180.0;
const MAX_LON: f64 = 180.0;

/// Errors raised by the geodesy helpers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    /// The search radius was negative or NaN.
    #[error("search radius must be a non-negative distance, got {radius_km} km")]
    NegativeRadius {
        /// Radius as supplied, in kilometres.
        radius_km: f64,
    },
}

/// Great-circle distance between two coordinates, in kilometres.
///
/// Uses the spherical law of cosines. The cosine term is clamped to `[-1, 1]`
/// so rounding never pushes `acos` outside its domain.
///
/// # Examples
/// ```
/// use kerbside_core::{Coordinate, distance_between};
///
/// # fn main() -> Result<(), kerbside_core::CoordinateError> {
/// let a = Coordinate::new(43.894655, -78.802791)?;
/// let b = Coordinate::new(43.894245, -78.804540)?;
/// let km = distance_between(a, b);
/// assert!((km - 0.1476).abs() < 0.001);
/// assert_eq!(distance_between(a, a), 0.0);
/// # Ok(())
/// # }
/// ```
pub fn distance_between(a: Coordinate, b: Coordinate) -> f64 {
    distance_between_with_radius(a, b, EARTH_RADIUS_KM)
}

/// [`distance_between`] on a sphere of the given radius.
pub fn distance_between_with_radius(a: Coordinate, b: Coordinate, earth_radius_km: f64) -> f64 {
    // acos(1 - ulp) is ~1.5e-8 rad, so identical points short-circuit.
    if a == b {
        return 0.0;
    }
    let (lat_a, lon_a) = (a.lat_radians(), a.lon_radians());
    let (lat_b, lon_b) = (b.lat_radians(), b.lon_radians());
    let cosine = lat_a.sin() * lat_b.sin() + lat_a.cos() * lat_b.cos() * (lon_a - lon_b).cos();
    earth_radius_km * cosine.clamp(-1.0, 1.0).acos()
}

/// Rhumb-line bearing from `from` to `to`, in degrees within `[0, 360)`.
///
/// The longitude delta takes the short way across the antimeridian.
pub fn bearing_between(from: Coordinate, to: Coordinate) -> f64 {
    let (lat_a, lon_a) = (from.lat_radians(), from.lon_radians());
    let (lat_b, lon_b) = (to.lat_radians(), to.lon_radians());

    let mut delta_lon = lon_b - lon_a;
    let delta_phi = ((lat_b / 2.0 + FRAC_PI_4).tan() / (lat_a / 2.0 + FRAC_PI_4).tan()).ln();

    if delta_lon.abs() > PI {
        delta_lon = if delta_lon > 0.0 {
            -(TAU - delta_lon)
        } else {
            TAU + delta_lon
        };
    }

    (delta_lon.atan2(delta_phi).to_degrees() + 360.0) % 360.0
}

/// Compass octant of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Heading {
    /// `NB`
    Northbound,
    /// `NE`
    NorthEast,
    /// `EB`
    Eastbound,
    /// `SE`
    SouthEast,
    /// `SB`
    Southbound,
    /// `SW`
    SouthWest,
    /// `WB`
    Westbound,
    /// `NW`
    NorthWest,
}

impl Heading {
    /// Map a bearing in degrees to its octant.
    ///
    /// Each octant owns its inclusive upper bound (22.5, 67.5, … 337.5);
    /// bearings above 337.5 wrap back to [`Heading::Northbound`].
    pub fn from_bearing(bearing: f64) -> Self {
        const OCTANTS: [(f64, Heading); 8] = [
            (22.5, Heading::Northbound),
            (67.5, Heading::NorthEast),
            (112.5, Heading::Eastbound),
            (157.5, Heading::SouthEast),
            (202.5, Heading::Southbound),
            (247.5, Heading::SouthWest),
            (292.5, Heading::Westbound),
            (337.5, Heading::NorthWest),
        ];
        OCTANTS
            .iter()
            .find(|(upper, _)| bearing <= *upper)
            .map_or(Self::Northbound, |(_, heading)| *heading)
    }

    /// Two-letter abbreviation, e.g. `"NB"`.
    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::Northbound => "NB",
            Self::NorthEast => "NE",
            Self::Eastbound => "EB",
            Self::SouthEast => "SE",
            Self::Southbound => "SB",
            Self::SouthWest => "SW",
            Self::Westbound => "WB",
            Self::NorthWest => "NW",
        }
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// Latitude/longitude box produced by [`create_box`].
///
/// When the box crosses the antimeridian the south-west longitude is greater
/// than the north-east longitude; [`SearchBox::rects`] then yields two ranges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchBox {
    south_west: Coordinate,
    north_east: Coordinate,
}

impl SearchBox {
    fn from_degrees(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        let lat = |degrees: f64| degrees.clamp(MIN_LAT, MAX_LAT);
        let lon = |degrees: f64| degrees.clamp(MIN_LON, MAX_LON);
        Self {
            south_west: Coordinate::from_degrees_unchecked(lat(min_lat), lon(min_lon)),
            north_east: Coordinate::from_degrees_unchecked(lat(max_lat), lon(max_lon)),
        }
    }

    /// South-west corner.
    pub const fn south_west(&self) -> Coordinate {
        self.south_west
    }

    /// North-east corner.
    pub const fn north_east(&self) -> Coordinate {
        self.north_east
    }

    /// Whether the longitude range wraps across ±180°.
    pub fn wraps_antimeridian(&self) -> bool {
        self.south_west.lon() > self.north_east.lon()
    }

    /// Inclusive containment test that honours antimeridian wrapping.
    pub fn contains(&self, point: Coordinate) -> bool {
        let lat_ok = (self.south_west.lat()..=self.north_east.lat()).contains(&point.lat());
        let lon = point.lon();
        let lon_ok = if self.wraps_antimeridian() {
            lon >= self.south_west.lon() || lon <= self.north_east.lon()
        } else {
            (self.south_west.lon()..=self.north_east.lon()).contains(&lon)
        };
        lat_ok && lon_ok
    }

    /// Axis-aligned rectangles (`x = lon`, `y = lat`) covering the box.
    pub fn rects(&self) -> Vec<Rect<f64>> {
        let (south, north) = (self.south_west.lat(), self.north_east.lat());
        let (west, east) = (self.south_west.lon(), self.north_east.lon());
        let rect = |min_lon: f64, max_lon: f64| {
            Rect::new(
                Coord {
                    x: min_lon,
                    y: south,
                },
                Coord {
                    x: max_lon,
                    y: north,
                },
            )
        };
        if self.wraps_antimeridian() {
            vec![rect(west, 180.0), rect(-180.0, east)]
        } else {
            vec![rect(west, east)]
        }
    }
}

/// Build a search box reaching `radius_km` around `center`.
///
/// Near a pole the latitude range is clamped and the longitude range covers
/// the whole globe. Otherwise longitudes beyond ±180° wrap around.
///
/// # Examples
/// ```
/// use kerbside_core::{Coordinate, create_box};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let centre = Coordinate::new(43.894655, -78.802791)?;
/// let search = create_box(0.015, centre)?;
/// assert!(search.south_west().lat() < centre.lat());
/// assert!(search.north_east().lon() > centre.lon());
/// # Ok(())
/// # }
/// ```
pub fn create_box(radius_km: f64, center: Coordinate) -> Result<SearchBox, GeoError> {
    create_box_with_radius(radius_km, center, EARTH_RADIUS_KM)
}

/// [`create_box`] on a sphere of the given radius.
pub fn create_box_with_radius(
    radius_km: f64,
    center: Coordinate,
    earth_radius_km: f64,
) -> Result<SearchBox, GeoError> {
    if radius_km.is_nan() || radius_km < 0.0 {
        return Err(GeoError::NegativeRadius { radius_km });
    }

    // Offsets are computed in radians and applied in degrees, so a zero
    // radius reproduces the centre exactly.
    let angular = radius_km / earth_radius_km;
    let lat_offset = angular.to_degrees();

    let min_lat = center.lat() - lat_offset;
    let max_lat = center.lat() + lat_offset;

    if min_lat > MIN_LAT && max_lat < MAX_LAT {
        let lon_offset = (angular.sin() / center.lat_radians().cos())
            .asin()
            .to_degrees();

        let mut min_lon = center.lon() - lon_offset;
        if min_lon < MIN_LON {
            min_lon += 360.0;
        }
        let mut max_lon = center.lon() + lon_offset;
        if max_lon > MAX_LON {
            max_lon -= 360.0;
        }
        Ok(SearchBox::from_degrees(min_lat, min_lon, max_lat, max_lon))
    } else {
        Ok(SearchBox::from_degrees(min_lat, MIN_LON, max_lat, MAX_LON))
    }
}

/// Whether `to` lies inside the cone of half-angle `field_of_vision_degrees`
/// centred on `bearing` as seen from `from`.
///
/// Cone edges are inclusive and wrap at 0°/360°.
pub fn is_in_sight(
    bearing: f64,
    from: Coordinate,
    to: Coordinate,
    field_of_vision_degrees: f64,
) -> bool {
    let half_angle = field_of_vision_degrees.abs();
    if half_angle >= 180.0 {
        return true;
    }
    let left = (bearing - half_angle).rem_euclid(360.0);
    let right = (bearing + half_angle).rem_euclid(360.0);
    let target = bearing_between(from, to);

    if left <= right {
        (left..=right).contains(&target)
    } else {
        target >= left || target <= right
    }
}
