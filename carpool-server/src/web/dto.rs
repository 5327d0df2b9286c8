//! Data transfer objects for web requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::backend::{BookingDto, BookingPassenger, LocationDto, NewBooking};
use crate::domain::{AnchorMode, Coordinate, Place, UserId};
use crate::planner::{PlannedStop, RidePlan};
use crate::store::{PassengerSelection, PlannedTrip};

/// Request to set a session's start or end.
#[derive(Debug, Deserialize)]
pub struct SetPlaceRequest {
    /// Coordinate object or free-form address
    pub place: Place,
}

/// A resolved trip endpoint.
#[derive(Debug, Serialize)]
pub struct EndpointResult {
    pub coordinate: Coordinate,

    /// Address, or the raw coordinate when none is known
    pub label: String,
}

/// A session's stored trip state.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub start: Option<EndpointResult>,
    pub end: Option<EndpointResult>,
    pub selected_passengers: Vec<PassengerSelection>,
}

/// A rider asking to be picked up.
#[derive(Debug, Deserialize)]
pub struct RideRequestBody {
    pub user_id: UserId,
    pub pickup: Place,
    pub dropoff: Place,

    /// Defaults to now
    pub requested_at: Option<DateTime<Utc>>,
}

/// Response for a stored ride request.
#[derive(Debug, Serialize)]
pub struct RideRequestResponse {
    pub location: LocationDto,

    /// Estimated direct travel time
    pub duration_secs: i64,
    pub distance_meters: i64,
}

/// Request to plan a ride from a session's endpoints.
#[derive(Debug, Deserialize)]
pub struct PlanRideRequest {
    pub session_id: String,

    /// Departure or arrival instant (defaults to now)
    pub anchor: Option<DateTime<Utc>>,

    /// How to read `anchor` (defaults to departure)
    pub mode: Option<AnchorMode>,
}

/// A pickup in a planned ride.
#[derive(Debug, Serialize)]
pub struct StopResult {
    /// 1-based position in visiting order
    pub position: usize,
    pub user_id: UserId,
    pub pickup: Coordinate,
    pub pickup_address: String,
    pub dropoff_address: String,

    /// Missing when the leg into this stop had no usable duration
    pub pickup_at: Option<DateTime<Utc>>,
    pub distance_meters: Option<i64>,
}

/// Response for ride planning.
#[derive(Debug, Serialize)]
pub struct PlanRideResponse {
    /// Pickups in visiting order
    pub stops: Vec<StopResult>,
    pub departs_at: DateTime<Utc>,
    pub arrives_at: DateTime<Utc>,
    pub total_duration_secs: i64,
    pub total_distance_meters: i64,
    pub share_link: String,

    /// True when some pickups have no time
    pub partial: bool,
}

/// Request to book the passengers selected in a session.
///
/// The route and times come from the session's last plan.
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub session_id: String,
    pub driver: UserId,
}

/// Query for a user's trip history.
#[derive(Debug, Deserialize)]
pub struct BookingHistoryQuery {
    pub user_id: u64,
}

/// Response for trip history.
#[derive(Debug, Serialize)]
pub struct BookingHistoryResponse {
    pub bookings: Vec<BookingDto>,
}

/// Request to build a shareable link.
#[derive(Debug, Deserialize)]
pub struct LinkRequest {
    pub origin: Place,
    pub destination: Place,

    /// Stops in the order they will be visited
    #[serde(default)]
    pub waypoints: Vec<Place>,
}

/// Response for link building.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub url: String,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

// Conversion implementations

impl StopResult {
    pub fn from_stop(stop: &PlannedStop) -> Self {
        Self {
            position: stop.visit_position.0 + 1,
            user_id: stop.record.user_id,
            pickup: stop.record.start,
            pickup_address: stop.record.pickup_address.clone(),
            dropoff_address: stop.record.dropoff_address.clone(),
            pickup_at: stop.pickup_at,
            distance_meters: stop.distance_meters,
        }
    }
}

impl PlanRideResponse {
    pub fn from_plan(plan: &RidePlan) -> Self {
        Self {
            stops: plan.stops.iter().map(StopResult::from_stop).collect(),
            departs_at: plan.departs_at,
            arrives_at: plan.arrives_at,
            total_duration_secs: plan.total_duration_secs,
            total_distance_meters: plan.total_distance_meters,
            share_link: plan.share_link.clone(),
            partial: plan.is_partial(),
        }
    }
}

impl CreateBookingRequest {
    /// Build the backend body from the session's plan and chosen passengers.
    pub fn to_booking(&self, trip: &PlannedTrip, selected: &[PassengerSelection]) -> NewBooking {
        NewBooking {
            driver: self.driver.0,
            passengers: selected
                .iter()
                .map(|p| BookingPassenger {
                    user: p.user_id.0,
                    pickup_address: p.pickup_address.clone(),
                    pickup_time: p.pickup_at,
                })
                .collect(),
            route_link: trip.share_link.clone(),
            departure_time: Some(trip.departs_at),
            arrival_time: Some(trip.arrives_at),
        }
    }
}
