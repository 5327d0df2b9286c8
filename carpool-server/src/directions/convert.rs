//! Conversion from directions DTOs to domain route types.
//!
//! A response that is `OK` but structurally wrong (no routes, a coordinate
//! out of range, a waypoint order that is not a permutation) is treated as
//! a service failure: the request was fine, the answer was not.

use crate::domain::{Coordinate, OptimizedRoute, RouteLeg, Waypoint};

use super::error::RouteError;
use super::types::{DirectionsResponse, LatLngDto, LegDto};

/// Statuses meaning "these places cannot be connected by road".
const UNREACHABLE_STATUSES: &[&str] = &["ZERO_RESULTS", "NOT_FOUND"];

/// Convert a directions response for a request with the given waypoints.
///
/// The service returns one leg per stopover, while its waypoint order covers
/// pass-through waypoints as well.
pub fn convert_response(
    response: &DirectionsResponse,
    waypoints: &[Waypoint],
) -> Result<OptimizedRoute, RouteError> {
    check_status(response)?;

    let route = response
        .routes
        .first()
        .ok_or_else(|| RouteError::service("OK response with no routes"))?;

    let legs = route
        .legs
        .iter()
        .map(convert_leg)
        .collect::<Result<Vec<_>, _>>()?;

    // The service omits waypoint_order when there is nothing to reorder.
    let order = if route.waypoint_order.is_empty() {
        (0..waypoints.len()).collect()
    } else {
        route.waypoint_order.clone()
    };

    let stopovers: Vec<bool> = waypoints.iter().map(|w| w.stopover).collect();
    OptimizedRoute::with_stopovers(legs, order, &stopovers)
        .map_err(|e| RouteError::service(format!("invalid route in response: {e}")))
}

fn check_status(response: &DirectionsResponse) -> Result<(), RouteError> {
    let status = response.status.as_str();
    if status == "OK" {
        return Ok(());
    }

    if UNREACHABLE_STATUSES.contains(&status) {
        return Err(RouteError::Unreachable {
            status: status.to_string(),
        });
    }

    let message = match &response.error_message {
        Some(detail) => format!("{status}: {detail}"),
        None => status.to_string(),
    };
    Err(RouteError::ServiceFailure { message })
}

fn convert_leg(leg: &LegDto) -> Result<RouteLeg, RouteError> {
    Ok(RouteLeg {
        start: convert_location(&leg.start_location)?,
        end: convert_location(&leg.end_location)?,
        duration_secs: leg.duration.as_ref().and_then(|d| d.value),
        distance_meters: leg.distance.as_ref().and_then(|d| d.value),
        end_address: leg.end_address.clone().filter(|a| !a.is_empty()),
    })
}

fn convert_location(loc: &LatLngDto) -> Result<Coordinate, RouteError> {
    Coordinate::new(loc.lat, loc.lng)
        .map_err(|e| RouteError::service(format!("bad leg location: {e}")))
}
