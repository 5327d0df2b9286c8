//! Nominatim response DTOs.
//!
//! Nominatim encodes coordinates as strings.

use serde::Deserialize;

use crate::domain::Coordinate;

/// One hit from `/search`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    pub lat: String,
    pub lon: String,
    pub display_name: Option<String>,
}

impl SearchHit {
    /// Parse into a validated coordinate.
    pub fn coordinate(&self) -> Option<Coordinate> {
        let lat = self.lat.parse().ok()?;
        let lng = self.lon.parse().ok()?;
        Coordinate::new(lat, lng).ok()
    }
}

/// Response from `/reverse`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReverseResult {
    pub display_name: Option<String>,
    /// Present when Nominatim could not resolve the point.
    pub error: Option<String>,
}
