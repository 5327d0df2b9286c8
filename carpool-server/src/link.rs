//! Shareable route links.
//!
//! Builds a Google Maps directions URL so a driver can open the optimized
//! route in a maps app. The builder never reorders: callers pass waypoints
//! already in visiting order.

use futures::future::join_all;
use tracing::warn;

use crate::domain::{Coordinate, Place};
use crate::geocode::Geocoder;

/// Base of the maps-service directions deep link.
const MAPS_DIR_URL: &str = "https://www.google.com/maps/dir/?api=1";

/// Errors from link construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    /// A location could not be resolved to a coordinate
    #[error("cannot build link: {0} is unresolved")]
    Unresolved(LinkSlot),
}

/// Which part of the link a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSlot {
    Origin,
    Destination,
    /// Position in visiting order
    Waypoint(usize),
}

impl std::fmt::Display for LinkSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkSlot::Origin => f.write_str("origin"),
            LinkSlot::Destination => f.write_str("destination"),
            LinkSlot::Waypoint(i) => write!(f, "waypoint {i}"),
        }
    }
}

/// Build a directions link through `ordered_waypoints`.
///
/// Any `None` entry (a location that failed geocoding) aborts with
/// [`LinkError::Unresolved`] rather than producing a link with a stop
/// missing.
///
/// # Example
///
/// ```
/// use carpool_server::domain::Coordinate;
/// use carpool_server::link::build_shareable_link;
///
/// let origin = Coordinate::new(29.6516, -82.3248).unwrap();
/// let destination = Coordinate::new(29.6, -82.4).unwrap();
/// let stop = Coordinate::new(29.62, -82.35).unwrap();
///
/// let url = build_shareable_link(&origin, &destination, &[Some(stop)]).unwrap();
/// assert_eq!(
///     url,
///     "https://www.google.com/maps/dir/?api=1&origin=29.6516,-82.3248\
///      &destination=29.6,-82.4&waypoints=29.62,-82.35&travelmode=driving&optimize=true"
/// );
/// ```
pub fn build_shareable_link(
    origin: &Coordinate,
    destination: &Coordinate,
    ordered_waypoints: &[Option<Coordinate>],
) -> Result<String, LinkError> {
    let waypoints = ordered_waypoints
        .iter()
        .enumerate()
        .map(|(i, c)| c.ok_or(LinkError::Unresolved(LinkSlot::Waypoint(i))))
        .collect::<Result<Vec<_>, _>>()?;

    let mut url = format!("{MAPS_DIR_URL}&origin={origin}&destination={destination}");

    if !waypoints.is_empty() {
        let joined = waypoints
            .iter()
            .map(Coordinate::to_string)
            .collect::<Vec<_>>()
            .join("|");
        url.push_str("&waypoints=");
        url.push_str(&joined);
    }

    url.push_str("&travelmode=driving&optimize=true");
    Ok(url)
}

/// Resolve every place, then build the link.
///
/// Address lookups run concurrently; the link is assembled only after all of
/// them have completed.
pub async fn resolve_and_build_link<G: Geocoder>(
    geocoder: &G,
    origin: &Place,
    destination: &Place,
    ordered_waypoints: &[Place],
) -> Result<String, LinkError> {
    let (origin_c, destination_c, waypoints) = futures::join!(
        resolve(geocoder, origin),
        resolve(geocoder, destination),
        join_all(ordered_waypoints.iter().map(|p| resolve(geocoder, p))),
    );

    let origin_c = origin_c.ok_or(LinkError::Unresolved(LinkSlot::Origin))?;
    let destination_c = destination_c.ok_or(LinkError::Unresolved(LinkSlot::Destination))?;

    build_shareable_link(&origin_c, &destination_c, &waypoints)
}

async fn resolve<G: Geocoder>(geocoder: &G, place: &Place) -> Option<Coordinate> {
    match place {
        Place::Coordinate(c) => Some(*c),
        Place::Address(address) => {
            let resolved = geocoder.geocode(address).await;
            if resolved.is_none() {
                warn!(address = %address, "Could not resolve address for route link");
            }
            resolved
        }
    }
}
