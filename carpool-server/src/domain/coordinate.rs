//! Geographic coordinate and place types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when constructing an out-of-range coordinate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid coordinate: {reason}")]
pub struct InvalidCoordinate {
    reason: &'static str,
}

/// A WGS84 latitude/longitude pair in decimal degrees.
///
/// Any `Coordinate` built through [`Coordinate::new`] is finite and within
/// range. Deserialization goes through the same check.
///
/// # Examples
///
/// ```
/// use carpool_server::domain::Coordinate;
///
/// let gainesville = Coordinate::new(29.6516, -82.3248).unwrap();
/// assert_eq!(gainesville.to_string(), "29.6516,-82.3248");
///
/// assert!(Coordinate::new(91.0, 0.0).is_err());
/// assert!(Coordinate::new(f64::NAN, 0.0).is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = InvalidCoordinate;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.lat, raw.lng)
    }
}

impl Coordinate {
    /// Create a coordinate, rejecting non-finite or out-of-range values.
    pub fn new(lat: f64, lng: f64) -> Result<Self, InvalidCoordinate> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(InvalidCoordinate {
                reason: "latitude and longitude must be finite",
            });
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(InvalidCoordinate {
                reason: "latitude must be within [-90, 90]",
            });
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(InvalidCoordinate {
                reason: "longitude must be within [-180, 180]",
            });
        }
        Ok(Self { lat, lng })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// Whether `other` lies inside the axis-aligned square of half-width
    /// `tolerance` degrees centred on `self`. Boundary is inclusive.
    ///
    /// This is a square in degree space, not a geodesic radius: it widens in
    /// metres towards the equator and collapses near the poles.
    pub fn within_square(&self, other: &Coordinate, tolerance: f64) -> bool {
        (self.lat - other.lat).abs() <= tolerance && (self.lng - other.lng).abs() <= tolerance
    }
}

impl fmt::Debug for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coordinate({}, {})", self.lat, self.lng)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// A location given either as a coordinate or as a free-form address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Place {
    Coordinate(Coordinate),
    Address(String),
}

impl Place {
    /// Returns the coordinate if this place is already resolved.
    pub fn coordinate(&self) -> Option<Coordinate> {
        match self {
            Place::Coordinate(c) => Some(*c),
            Place::Address(_) => None,
        }
    }

    /// Format for a directions request parameter.
    pub fn to_query_value(&self) -> String {
        match self {
            Place::Coordinate(c) => c.to_string(),
            Place::Address(a) => a.clone(),
        }
    }
}

impl From<Coordinate> for Place {
    fn from(c: Coordinate) -> Self {
        Place::Coordinate(c)
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Place::Coordinate(c) => write!(f, "{c}"),
            Place::Address(a) => f.write_str(a),
        }
    }
}
