//! Directions API response DTOs.
//!
//! These types map directly to the Google Directions JSON response. They
//! use `Option` liberally because the service omits fields it cannot fill.

use serde::Deserialize;

/// Top-level response from `/maps/api/directions/json`.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectionsResponse {
    /// `OK`, `ZERO_RESULTS`, `NOT_FOUND`, `OVER_QUERY_LIMIT`, ...
    pub status: String,

    /// Free-text detail accompanying a non-OK status.
    pub error_message: Option<String>,

    #[serde(default)]
    pub routes: Vec<RouteDto>,
}

/// One candidate route.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteDto {
    #[serde(default)]
    pub legs: Vec<LegDto>,

    /// Visiting order of the request's waypoints, present when
    /// `optimize:true` was requested.
    #[serde(default)]
    pub waypoint_order: Vec<usize>,

    pub summary: Option<String>,
}

/// One leg between consecutive stops.
#[derive(Debug, Clone, Deserialize)]
pub struct LegDto {
    pub start_location: LatLngDto,
    pub end_location: LatLngDto,
    pub duration: Option<TextValue>,
    pub distance: Option<TextValue>,
    pub start_address: Option<String>,
    pub end_address: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLngDto {
    pub lat: f64,
    pub lng: f64,
}

/// A measured quantity: `value` in SI units, `text` for display.
#[derive(Debug, Clone, Deserialize)]
pub struct TextValue {
    pub value: Option<i64>,
    pub text: Option<String>,
}
