//! Validated WGS84 coordinates.

use geo::Coord;
use thiserror::Error;

/// A latitude/longitude pair in degrees.
///
/// Latitude lies in `[-90, 90]` and longitude in `[-180, 180]`. Values are
/// checked on construction, so every `Coordinate` in circulation is usable by
/// the geodetic functions without further validation.
///
/// # Examples
/// ```
/// use kerbside_core::Coordinate;
///
/// # fn main() -> Result<(), kerbside_core::CoordinateError> {
/// let fix = Coordinate::new(43.894655, -78.802791)?;
/// assert_eq!(fix.lat(), 43.894655);
/// assert_eq!(fix.lon(), -78.802791);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

/// Errors returned when a coordinate fails validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    /// A component was NaN or infinite.
    #[error("coordinate components must be finite (lat={lat}, lon={lon})")]
    NonFinite {
        /// Latitude as supplied.
        lat: f64,
        /// Longitude as supplied.
        lon: f64,
    },
    /// Latitude fell outside `[-90, 90]`.
    #[error("latitude {lat} is outside [-90, 90]")]
    LatitudeOutOfRange {
        /// Latitude as supplied.
        lat: f64,
    },
    /// Longitude fell outside `[-180, 180]`.
    #[error("longitude {lon} is outside [-180, 180]")]
    LongitudeOutOfRange {
        /// Longitude as supplied.
        lon: f64,
    },
    /// A slice did not hold exactly a latitude and a longitude.
    #[error("expected (latitude, longitude), got {len} components")]
    Arity {
        /// Number of components supplied.
        len: usize,
    },
}

impl Coordinate {
    /// Validate and construct a coordinate from degrees.
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(CoordinateError::NonFinite { lat, lon });
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::LatitudeOutOfRange { lat });
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(CoordinateError::LongitudeOutOfRange { lon });
        }
        Ok(Self { lat, lon })
    }

    /// Callers must already have clamped both components into range.
    pub(crate) const fn from_degrees_unchecked(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Latitude in degrees.
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub const fn lon(&self) -> f64 {
        self.lon
    }

    /// Latitude in radians.
    pub fn lat_radians(&self) -> f64 {
        self.lat.to_radians()
    }

    /// Longitude in radians.
    pub fn lon_radians(&self) -> f64 {
        self.lon.to_radians()
    }
}

impl TryFrom<&[f64]> for Coordinate {
    type Error = CoordinateError;

    fn try_from(pair: &[f64]) -> Result<Self, Self::Error> {
        match pair {
            [lat, lon] => Self::new(*lat, *lon),
            other => Err(CoordinateError::Arity { len: other.len() }),
        }
    }
}

impl TryFrom<(f64, f64)> for Coordinate {
    type Error = CoordinateError;

    fn try_from((lat, lon): (f64, f64)) -> Result<Self, Self::Error> {
        Self::new(lat, lon)
    }
}

/// `geo` uses `x = longitude`, `y = latitude`.
impl TryFrom<Coord<f64>> for Coordinate {
    type Error = CoordinateError;

    fn try_from(coord: Coord<f64>) -> Result<Self, Self::Error> {
        Self::new(coord.y, coord.x)
    }
}

impl From<Coordinate> for Coord<f64> {
    fn from(coordinate: Coordinate) -> Self {
        Coord {
            x: coordinate.lon,
            y: coordinate.lat,
        }
    }
}
