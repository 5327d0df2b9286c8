//! Geocoding collaborator.
//!
//! Address → coordinate and coordinate → address lookups are delegated to
//! OpenStreetMap Nominatim. Lookups are best-effort: a failed forward lookup
//! yields `None`, a failed reverse lookup yields an empty string, and callers
//! fall back to displaying raw coordinates.

mod client;
mod error;
mod types;

use std::future::Future;

use crate::domain::Coordinate;

pub use client::{NominatimClient, NominatimConfig};
pub use error::GeocodeError;

/// Forward and reverse geocoding.
pub trait Geocoder {
    /// Resolve an address. `None` when the service cannot.
    fn geocode(&self, address: &str) -> impl Future<Output = Option<Coordinate>> + Send;

    /// Describe a coordinate. Empty string when the service cannot.
    fn reverse_geocode(&self, coordinate: Coordinate) -> impl Future<Output = String> + Send;
}

/// Human-readable label for a location, falling back to the raw coordinate
/// when reverse geocoding produced nothing.
pub fn display_label(coordinate: Coordinate, address: &str) -> String {
    let address = address.trim();
    if address.is_empty() {
        coordinate.to_string()
    } else {
        address.to_string()
    }
}
