//! Unit tests for ride planning.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use super::*;
use crate::directions::{DirectionsResponse, MockDirections, RetryPolicy, RouteError, RouteOptimizer};
use crate::domain::{
    AnchorMode, Coordinate, LocationRecord, OptimizedRoute, Place, RouteLeg, UserId,
    VisitPosition, Waypoint,
};
use crate::matcher::test_support::{coord, record};
use crate::scheduler::FixedClock;
use crate::store::{SessionContext, SessionId};

const FIXTURE: &str = include_str!("../../data/mock_directions/gainesville.json");

fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp(1_710_513_000, 0).unwrap()
}

fn origin() -> Coordinate {
    coord(29.6516, -82.3248)
}

fn destination() -> Coordinate {
    coord(29.6, -82.4)
}

fn fixture_optimizer() -> MockDirections {
    let response: DirectionsResponse = serde_json::from_str(FIXTURE).unwrap();
    MockDirections::from_responses(vec![response])
}

fn config() -> PlannerConfig {
    PlannerConfig::default().with_retry(RetryPolicy::new(3, std::time::Duration::ZERO))
}

/// Two riders heading to the destination and one going elsewhere.
fn candidates() -> Vec<LocationRecord> {
    vec![
        record(1, (29.6152, -82.3889), (29.6, -82.4)),
        record(2, (29.6301, -82.3712), (29.6002, -82.4001)),
        record(3, (29.7, -82.3), (29.7, -82.3)),
    ]
}

/// Optimizer that always returns the same route and counts its calls.
struct FixedRoute {
    result: Result<(Vec<RouteLeg>, Vec<usize>), RouteError>,
    calls: Mutex<Vec<usize>>,
}

impl FixedRoute {
    fn ok(durations: &[Option<i64>], order: Vec<usize>) -> Self {
        let legs = durations
            .iter()
            .map(|d| crate::domain::test_support::leg(*d))
            .collect();
        Self {
            result: Ok((legs, order)),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn err(error: RouteError) -> Self {
        Self {
            result: Err(error),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn waypoint_counts(&self) -> Vec<usize> {
        self.calls.lock().unwrap().clone()
    }
}

impl RouteOptimizer for FixedRoute {
    async fn optimize_route(
        &self,
        _origin: &Place,
        _destination: &Place,
        waypoints: &[Waypoint],
    ) -> Result<OptimizedRoute, RouteError> {
        self.calls.lock().unwrap().push(waypoints.len());
        let (legs, order) = self.result.clone()?;
        OptimizedRoute::new(legs, order, waypoints.len())
            .map_err(|e| RouteError::service(e.to_string()))
    }
}

fn users(plan: &RidePlan) -> Vec<UserId> {
    plan.stops.iter().map(|s| s.record.user_id).collect()
}

#[tokio::test]
async fn departure_plan_reorders_riders() {
    let request = RideRequest::new(origin(), destination()).with_anchor(t0(), AnchorMode::Departure);
    let plan = plan_ride(
        &fixture_optimizer(),
        &request,
        &candidates(),
        &config(),
        &FixedClock(t0()),
    )
    .await
    .unwrap();

    // waypoint_order [1, 0]: the second matched rider is picked up first.
    assert_eq!(users(&plan), vec![UserId(2), UserId(1)]);
    assert_eq!(plan.stops[0].visit_position, VisitPosition(0));
    assert_eq!(plan.stops[0].pickup_at, Some(t0() + Duration::seconds(300)));
    assert_eq!(plan.stops[1].pickup_at, Some(t0() + Duration::seconds(900)));
    assert_eq!(plan.stops[0].distance_meters, Some(4100));

    assert_eq!(plan.departs_at, t0());
    assert_eq!(plan.arrives_at, t0() + Duration::seconds(1800));
    assert_eq!(plan.total_duration_secs, 1800);
    assert_eq!(plan.total_distance_meters, 23200);
    assert!(!plan.is_partial());
}

#[tokio::test]
async fn arrival_plan_counts_back_from_anchor() {
    let t1 = t0() + Duration::hours(2);
    let request = RideRequest::new(origin(), destination()).with_anchor(t1, AnchorMode::Arrival);
    let plan = plan_ride(
        &fixture_optimizer(),
        &request,
        &candidates(),
        &config(),
        &FixedClock(t0()),
    )
    .await
    .unwrap();

    assert_eq!(plan.stops[0].pickup_at, Some(t1 - Duration::seconds(1500)));
    assert_eq!(plan.stops[1].pickup_at, Some(t1 - Duration::seconds(900)));
    assert_eq!(plan.departs_at, t1 - Duration::seconds(1800));
    assert_eq!(plan.arrives_at, t1);
}

#[tokio::test]
async fn share_link_follows_visiting_order() {
    let request = RideRequest::new(origin(), destination());
    let plan = plan_ride(
        &fixture_optimizer(),
        &request,
        &candidates(),
        &config(),
        &FixedClock(t0()),
    )
    .await
    .unwrap();

    assert_eq!(
        plan.share_link,
        "https://www.google.com/maps/dir/?api=1&origin=29.6516,-82.3248\
         &destination=29.6,-82.4&waypoints=29.6301,-82.3712|29.6152,-82.3889\
         &travelmode=driving&optimize=true"
    );
}

#[tokio::test]
async fn missing_anchor_uses_clock() {
    let request = RideRequest::new(origin(), destination());
    let plan = plan_ride(
        &fixture_optimizer(),
        &request,
        &candidates(),
        &config(),
        &FixedClock(t0()),
    )
    .await
    .unwrap();

    assert_eq!(plan.departs_at, t0());
    assert_eq!(plan.stops[0].pickup_at, Some(t0() + Duration::seconds(300)));
}

#[tokio::test]
async fn default_mode_comes_from_config() {
    let config = PlannerConfig::new(0.0005, RetryPolicy::none(), AnchorMode::Arrival);
    let mut request = RideRequest::new(origin(), destination());
    request.anchor = Some(t0());

    let plan = plan_ride(
        &fixture_optimizer(),
        &request,
        &candidates(),
        &config,
        &FixedClock(t0()),
    )
    .await
    .unwrap();

    assert_eq!(plan.arrives_at, t0());
}

#[tokio::test]
async fn no_match_skips_optimizer() {
    let optimizer = FixedRoute::ok(&[Some(60)], vec![]);
    let request = RideRequest::new(origin(), coord(10.0, 10.0));

    let err = plan_ride(&optimizer, &request, &candidates(), &config(), &FixedClock(t0()))
        .await
        .unwrap_err();

    assert!(matches!(err, PlanError::MatchNotFound(_)));
    assert!(optimizer.waypoint_counts().is_empty());
}

#[tokio::test]
async fn unreachable_route_is_reported() {
    let optimizer = FixedRoute::err(RouteError::Unreachable {
        status: "ZERO_RESULTS".into(),
    });
    let request = RideRequest::new(origin(), destination());

    let err = plan_ride(&optimizer, &request, &candidates(), &config(), &FixedClock(t0()))
        .await
        .unwrap_err();

    assert!(matches!(err, PlanError::Route(RouteError::Unreachable { .. })));
    assert_eq!(optimizer.waypoint_counts(), vec![2]);
}

#[tokio::test]
async fn service_failure_is_retried_then_reported() {
    let optimizer = FixedRoute::err(RouteError::service("timeout"));
    let request = RideRequest::new(origin(), destination());

    let err = plan_ride(&optimizer, &request, &candidates(), &config(), &FixedClock(t0()))
        .await
        .unwrap_err();

    assert!(matches!(err, PlanError::Route(RouteError::ServiceFailure { .. })));
    assert_eq!(optimizer.waypoint_counts().len(), 3);
}

#[tokio::test]
async fn skipped_leg_leaves_stop_unscheduled() {
    let optimizer = FixedRoute::ok(&[None, Some(600), Some(900)], vec![0, 1]);
    let request = RideRequest::new(origin(), destination()).with_anchor(t0(), AnchorMode::Departure);

    let plan = plan_ride(&optimizer, &request, &candidates(), &config(), &FixedClock(t0()))
        .await
        .unwrap();

    assert!(plan.is_partial());
    assert_eq!(plan.skipped_legs, vec![0]);
    assert_eq!(plan.stops[0].pickup_at, None);
    assert_eq!(plan.stops[1].pickup_at, Some(t0() + Duration::seconds(600)));

    let selections = plan.passenger_selections();
    assert_eq!(selections.len(), 1);
    assert_eq!(selections[0].user_id, UserId(2));

    let trip = plan.planned_trip();
    assert_eq!(trip.share_link, plan.share_link);
    assert_eq!(trip.departs_at, t0());
    assert_eq!(trip.arrives_at, t0() + Duration::seconds(1500));
}

#[tokio::test]
async fn absurd_leg_duration_is_skipped_not_fatal() {
    let optimizer = FixedRoute::ok(&[Some(10_000_000_000_000), Some(600), Some(900)], vec![0, 1]);
    let request = RideRequest::new(origin(), destination()).with_anchor(t0(), AnchorMode::Arrival);

    let plan = plan_ride(&optimizer, &request, &candidates(), &config(), &FixedClock(t0()))
        .await
        .unwrap();

    assert_eq!(plan.skipped_legs, vec![0]);
    assert_eq!(plan.total_duration_secs, 1500);
    assert_eq!(plan.departs_at, t0() - Duration::seconds(1500));
    assert_eq!(plan.stops[1].pickup_at, Some(t0() - Duration::seconds(900)));
}

#[tokio::test]
async fn trip_end_past_end_of_time_collapses_onto_anchor() {
    let optimizer = FixedRoute::ok(&[Some(600), Some(600), Some(600)], vec![0, 1]);
    let request = RideRequest::new(origin(), destination())
        .with_anchor(DateTime::<Utc>::MAX_UTC, AnchorMode::Departure);

    let plan = plan_ride(&optimizer, &request, &candidates(), &config(), &FixedClock(t0()))
        .await
        .unwrap();

    assert_eq!(plan.arrives_at, DateTime::<Utc>::MAX_UTC);
    assert_eq!(plan.skipped_legs, vec![0, 1]);
    assert!(plan.passenger_selections().is_empty());
}

#[test]
fn request_from_session_needs_both_ends() {
    let mut session = SessionContext::new(SessionId::parse("s1").unwrap());
    assert_eq!(
        RideRequest::from_session(&session),
        Err(PlanError::MissingCoordinates("start"))
    );

    session.start = Some(origin());
    assert_eq!(
        RideRequest::from_session(&session),
        Err(PlanError::MissingCoordinates("end"))
    );

    session.end = Some(destination());
    let request = RideRequest::from_session(&session).unwrap();
    assert_eq!(request.origin, origin());
    assert!(request.anchor.is_none());
}

#[tokio::test]
async fn ride_request_validation() {
    let rider = record(7, (29.65, -82.32), (29.6, -82.4));

    let ok = FixedRoute::ok(&[Some(1200)], vec![]);
    let route = validate_ride_request(&ok, &rider, &RetryPolicy::none())
        .await
        .unwrap();
    assert_eq!(route.total_duration_secs(), 1200);
    assert_eq!(ok.waypoint_counts(), vec![0]);

    let unreachable = FixedRoute::err(RouteError::Unreachable {
        status: "NOT_FOUND".into(),
    });
    let err = validate_ride_request(&unreachable, &rider, &RetryPolicy::none())
        .await
        .unwrap_err();
    assert!(matches!(err, RouteError::Unreachable { .. }));
}
