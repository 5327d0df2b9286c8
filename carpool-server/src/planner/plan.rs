//! Driver ride planning.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::directions::{RouteError, RouteOptimizer, optimize_with_retry};
use crate::domain::{
    AnchorMode, Coordinate, LocationRecord, OptimizedRoute, Place, VisitPosition, Waypoint,
};
use crate::link::{LinkError, build_shareable_link};
use crate::matcher::{MatchNotFound, require_matches};
use crate::scheduler::{Clock, compute_pickup_times};
use crate::store::{PassengerSelection, PlannedTrip, SessionContext};

use super::config::PlannerConfig;

/// Errors from planning a ride.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    #[error("session has no {0} coordinates")]
    MissingCoordinates(&'static str),

    #[error(transparent)]
    MatchNotFound(#[from] MatchNotFound),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Link(#[from] LinkError),
}

/// A driver's request to plan a trip.
#[derive(Debug, Clone, PartialEq)]
pub struct RideRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,
    /// Departure or arrival instant; `None` means now.
    pub anchor: Option<DateTime<Utc>>,
    /// Falls back to the planner's default mode.
    pub mode: Option<AnchorMode>,
}

impl RideRequest {
    pub fn new(origin: Coordinate, destination: Coordinate) -> Self {
        Self {
            origin,
            destination,
            anchor: None,
            mode: None,
        }
    }

    /// Build a request from the coordinates stored in a session.
    pub fn from_session(session: &SessionContext) -> Result<Self, PlanError> {
        let origin = session.start.ok_or(PlanError::MissingCoordinates("start"))?;
        let destination = session.end.ok_or(PlanError::MissingCoordinates("end"))?;
        Ok(Self::new(origin, destination))
    }

    pub fn with_anchor(mut self, anchor: DateTime<Utc>, mode: AnchorMode) -> Self {
        self.anchor = Some(anchor);
        self.mode = Some(mode);
        self
    }
}

/// A matched rider in visiting order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedStop {
    pub visit_position: VisitPosition,
    pub record: LocationRecord,
    /// `None` when the leg into this stop had no usable duration.
    pub pickup_at: Option<DateTime<Utc>>,
    /// Length of the leg ending at this stop.
    pub distance_meters: Option<i64>,
}

/// The outcome of planning a ride.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RidePlan {
    pub stops: Vec<PlannedStop>,
    pub departs_at: DateTime<Utc>,
    pub arrives_at: DateTime<Utc>,
    pub total_duration_secs: i64,
    pub total_distance_meters: i64,
    pub share_link: String,
    /// Legs left out of the schedule.
    pub skipped_legs: Vec<usize>,
    #[serde(skip)]
    pub route: OptimizedRoute,
}

impl RidePlan {
    /// True when some pickups could not be given a time.
    pub fn is_partial(&self) -> bool {
        !self.skipped_legs.is_empty()
    }

    /// Stops with a pickup time, as session passenger selections.
    pub fn passenger_selections(&self) -> Vec<PassengerSelection> {
        self.stops
            .iter()
            .filter_map(|stop| {
                Some(PassengerSelection {
                    user_id: stop.record.user_id,
                    pickup_address: stop.record.pickup_address.clone(),
                    dropoff_address: stop.record.dropoff_address.clone(),
                    pickup_at: stop.pickup_at?,
                })
            })
            .collect()
    }

    /// The route and times a booking of this plan's passengers is made on.
    pub fn planned_trip(&self) -> PlannedTrip {
        PlannedTrip {
            share_link: self.share_link.clone(),
            departs_at: self.departs_at,
            arrives_at: self.arrives_at,
        }
    }
}

/// Departure and arrival instants for a trip of `total_secs` around `anchor`.
///
/// An unrepresentable far end collapses onto the anchor.
fn trip_window(anchor: DateTime<Utc>, mode: AnchorMode, total_secs: i64) -> (DateTime<Utc>, DateTime<Utc>) {
    let total = Duration::try_seconds(total_secs);
    let far_end = match mode {
        AnchorMode::Departure => total.and_then(|t| anchor.checked_add_signed(t)),
        AnchorMode::Arrival => total.and_then(|t| anchor.checked_sub_signed(t)),
    };
    let far_end = far_end.unwrap_or_else(|| {
        warn!(%anchor, total_secs, "Trip end is out of range");
        anchor
    });
    match mode {
        AnchorMode::Departure => (anchor, far_end),
        AnchorMode::Arrival => (far_end, anchor),
    }
}

/// Plan a ride for a driver.
///
/// 1. Match ride requests whose end lies near the driver's destination
/// 2. Ask the optimizer for a route through the riders' start points
/// 3. Schedule a pickup at the end of every leg but the last
/// 4. Map each visited stop back to its rider through the waypoint order
/// 5. Build a shareable link with the stops in visiting order
pub async fn plan_ride<O: RouteOptimizer + Sync>(
    optimizer: &O,
    request: &RideRequest,
    candidates: &[LocationRecord],
    config: &PlannerConfig,
    clock: &impl Clock,
) -> Result<RidePlan, PlanError> {
    let matches = require_matches(&request.destination, candidates, config.tolerance)?;

    let waypoints: Vec<Waypoint> = matches.iter().map(|r| Waypoint::stop(r.start)).collect();
    debug!(stops = waypoints.len(), "Requesting optimized route");

    let route = optimize_with_retry(
        optimizer,
        &Place::Coordinate(request.origin),
        &Place::Coordinate(request.destination),
        &waypoints,
        &config.retry,
    )
    .await?;

    let anchor = request.anchor.unwrap_or_else(|| clock.now());
    let mode = request.mode.unwrap_or(config.default_mode);
    let schedule = compute_pickup_times(route.legs(), Some(anchor), mode, clock);

    if schedule.is_partial() {
        warn!(
            skipped = ?schedule.skipped_legs,
            "Some pickups have no scheduled time"
        );
    }

    let mut stops = Vec::with_capacity(route.stop_count());
    for (position, index) in route.stop_assignments() {
        // The permutation was validated against `matches.len()`.
        let Some(record) = matches.get(index.0) else {
            continue;
        };
        stops.push(PlannedStop {
            visit_position: position,
            record: record.clone(),
            pickup_at: schedule.for_leg(position.0).map(|e| e.pickup_at),
            distance_meters: route.legs().get(position.0).and_then(|l| l.distance_meters),
        });
    }

    let ordered: Vec<Option<Coordinate>> = stops.iter().map(|s| Some(s.record.start)).collect();
    let share_link = build_shareable_link(&request.origin, &request.destination, &ordered)?;

    let (departs_at, arrives_at) = trip_window(anchor, mode, route.total_duration_secs());

    info!(
        stops = stops.len(),
        duration_secs = route.total_duration_secs(),
        %departs_at,
        %arrives_at,
        "Planned ride"
    );

    Ok(RidePlan {
        stops,
        departs_at,
        arrives_at,
        total_duration_secs: route.total_duration_secs(),
        total_distance_meters: route.total_distance_meters(),
        share_link,
        skipped_legs: schedule.skipped_legs,
        route,
    })
}

