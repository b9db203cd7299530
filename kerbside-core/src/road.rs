//! Road-graph value types: road classes, way memberships and streets.

use std::fmt;

/// OpenStreetMap node identifier.
pub type NodeId = i64;

/// OpenStreetMap way identifier.
pub type WayId = i64;

/// Speed assumed for classes without a specific default, in km/h.
pub const FALLBACK_SPEED_KMH: u32 = 50;

/// Category of a way, taken from its `highway` tag.
///
/// Unknown values survive as [`RoadClass::Other`] so persisted indexes built
/// with a wider whitelist still load.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "String", into = "String")
)]
pub enum RoadClass {
    Motorway,
    Trunk,
    Primary,
    Secondary,
    Tertiary,
    Unclassified,
    Residential,
    Service,
    Road,
    MotorwayLink,
    TrunkLink,
    PrimaryLink,
    SecondaryLink,
    TertiaryLink,
    /// Any other `highway` value.
    Other(String),
}

impl RoadClass {
    /// The classes a vehicle is expected to drive on.
    pub fn routable() -> [Self; 14] {
        [
            Self::Motorway,
            Self::Trunk,
            Self::Primary,
            Self::Secondary,
            Self::Tertiary,
            Self::Unclassified,
            Self::Residential,
            Self::Service,
            Self::Road,
            Self::MotorwayLink,
            Self::TrunkLink,
            Self::PrimaryLink,
            Self::SecondaryLink,
            Self::TertiaryLink,
        ]
    }

    /// The `highway` tag value for this class.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Motorway => "motorway",
            Self::Trunk => "trunk",
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Tertiary => "tertiary",
            Self::Unclassified => "unclassified",
            Self::Residential => "residential",
            Self::Service => "service",
            Self::Road => "road",
            Self::MotorwayLink => "motorway_link",
            Self::TrunkLink => "trunk_link",
            Self::PrimaryLink => "primary_link",
            Self::SecondaryLink => "secondary_link",
            Self::TertiaryLink => "tertiary_link",
            Self::Other(value) => value,
        }
    }

    /// Default speed limit for the class when none is declared, in km/h.
    ///
    /// # Examples
    /// ```
    /// use kerbside_core::RoadClass;
    ///
    /// assert_eq!(RoadClass::Primary.inferred_speed_kmh(), 80);
    /// assert_eq!(RoadClass::from("track").inferred_speed_kmh(), 50);
    /// ```
    pub const fn inferred_speed_kmh(&self) -> u32 {
        match self {
            Self::Motorway => 100,
            Self::Primary => 80,
            Self::Secondary => 60,
            Self::Residential | Self::Tertiary => 50,
            _ => FALLBACK_SPEED_KMH,
        }
    }
}

impl From<&str> for RoadClass {
    fn from(value: &str) -> Self {
        match value {
            "motorway" => Self::Motorway,
            "trunk" => Self::Trunk,
            "primary" => Self::Primary,
            "secondary" => Self::Secondary,
            "tertiary" => Self::Tertiary,
            "unclassified" => Self::Unclassified,
            "residential" => Self::Residential,
            "service" => Self::Service,
            "road" => Self::Road,
            "motorway_link" => Self::MotorwayLink,
            "trunk_link" => Self::TrunkLink,
            "primary_link" => Self::PrimaryLink,
            "secondary_link" => Self::SecondaryLink,
            "tertiary_link" => Self::TertiaryLink,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl From<String> for RoadClass {
    fn from(value: String) -> Self {
        match Self::from(value.as_str()) {
            Self::Other(_) => Self::Other(value),
            known => known,
        }
    }
}

impl From<RoadClass> for String {
    fn from(class: RoadClass) -> Self {
        match class {
            RoadClass::Other(value) => value,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for RoadClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a node within a way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WayMembership {
    /// Way containing the node.
    pub way_id: WayId,
    /// Zero-based traversal order of the node along the way.
    pub order: u32,
}

/// Street attributes as persisted for a way.
///
/// `lanes` and `declared_speed_kmh` use `0` for "unknown".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreetAttributes {
    /// OSM id of the way.
    pub way_id: WayId,
    /// Value of the `name` tag, if any.
    pub name: Option<String>,
    /// Lane count from the `lanes` tag.
    pub lanes: u32,
    /// Speed limit from the `maxspeed` tag, in km/h.
    pub declared_speed_kmh: u32,
    /// Class taken from the `highway` tag.
    pub road_class: RoadClass,
    /// `true` only when `oneway=yes`.
    pub oneway: bool,
}

/// Whether a street's speed came from the map or from its road class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SpeedSource {
    Declared,
    Inferred,
}

/// A street resolved from the index, with its effective speed limit.
///
/// # Examples
/// ```
/// use kerbside_core::{RoadClass, SpeedSource, Street, StreetAttributes};
///
/// let street = Street::from(StreetAttributes {
///     way_id: 100,
///     name: Some("Main St".into()),
///     lanes: 0,
///     declared_speed_kmh: 0,
///     road_class: RoadClass::Residential,
///     oneway: false,
/// });
/// assert_eq!(street.max_speed_kmh, 50);
/// assert_eq!(street.speed_source, SpeedSource::Inferred);
/// assert!(!street.speed_is_known());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Street {
    /// OSM id of the way.
    pub way_id: WayId,
    /// Street name; see [`Street::display_name`] for the fallback.
    pub name: Option<String>,
    /// Lane count, `0` when unknown.
    pub lanes: u32,
    /// Whether traffic runs only in the way's direction.
    pub oneway: bool,
    /// Road class of the way.
    pub road_class: RoadClass,
    /// Declared speed limit, or the class fallback when none was declared.
    pub max_speed_kmh: u32,
    /// Where `max_speed_kmh` came from.
    pub speed_source: SpeedSource,
}

impl Street {
    /// Name shown to a driver; `"unnamed"` when the way has no name.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }

    /// `true` when the speed limit was declared in the source map.
    pub fn speed_is_known(&self) -> bool {
        self.speed_source == SpeedSource::Declared
    }
}

impl From<StreetAttributes> for Street {
    fn from(attributes: StreetAttributes) -> Self {
        let (max_speed_kmh, speed_source) = match attributes.declared_speed_kmh {
            0 => (
                attributes.road_class.inferred_speed_kmh(),
                SpeedSource::Inferred,
            ),
            declared => (declared, SpeedSource::Declared),
        };
        Self {
            way_id: attributes.way_id,
            name: attributes.name,
            lanes: attributes.lanes,
            oneway: attributes.oneway,
            road_class: attributes.road_class,
            max_speed_kmh,
            speed_source,
        }
    }
}
