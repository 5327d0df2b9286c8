//! Route types produced by the directions adapter.
//!
//! The directions service may reorder waypoints. Reassociating a leg with the
//! passenger it picks up goes through [`OptimizedRoute::waypoint_for_leg`],
//! never through positional assumptions about the input array.

use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::{Coordinate, Place};

/// Index into the caller's original waypoint list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WaypointIndex(pub usize);

/// Position of a stop in visiting order (0 = first stop after the origin).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VisitPosition(pub usize);

/// An intermediate stop for a directions request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub location: Place,
    /// `false` routes through the point without stopping.
    pub stopover: bool,
}

impl Waypoint {
    /// A stopover waypoint (a pickup).
    pub fn stop(location: impl Into<Place>) -> Self {
        Self {
            location: location.into(),
            stopover: true,
        }
    }

    /// A pass-through waypoint.
    pub fn via(location: impl Into<Place>) -> Self {
        Self {
            location: location.into(),
            stopover: false,
        }
    }
}

/// One hop of a driving route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub start: Coordinate,
    pub end: Coordinate,
    /// Travel time in seconds. `None` when the service omitted it.
    pub duration_secs: Option<i64>,
    pub distance_meters: Option<i64>,
    /// Human-readable address of the leg's end, when the service supplies one.
    pub end_address: Option<String>,
}

/// Longest leg duration accepted for scheduling: one week.
pub const MAX_LEG_DURATION_SECS: i64 = 7 * 24 * 60 * 60;

impl RouteLeg {
    /// Duration usable for scheduling: present, strictly positive and no
    /// longer than [`MAX_LEG_DURATION_SECS`].
    pub fn valid_duration(&self) -> Option<i64> {
        self.duration_secs
            .filter(|d| (1..=MAX_LEG_DURATION_SECS).contains(d))
    }
}

/// A driving route with its waypoints in optimized visiting order.
///
/// Invariants, checked at construction:
/// - `waypoint_order` is a permutation of `0..waypoint_count`
/// - `legs.len()` is the number of stopover waypoints plus one
///
/// Pass-through waypoints appear in the visiting order but end no leg.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizedRoute {
    legs: Vec<RouteLeg>,
    waypoint_order: Vec<WaypointIndex>,
    /// Stopovers in visiting order; leg `i` ends at `stops[i]`.
    stops: Vec<WaypointIndex>,
}

impl OptimizedRoute {
    /// Build a route in which every waypoint is a stopover.
    pub fn new(
        legs: Vec<RouteLeg>,
        waypoint_order: Vec<usize>,
        waypoint_count: usize,
    ) -> Result<Self, DomainError> {
        Self::with_stopovers(legs, waypoint_order, &vec![true; waypoint_count])
    }

    /// Build a route for waypoints where `stopovers[i]` tells whether
    /// waypoint `i` ends a leg.
    pub fn with_stopovers(
        legs: Vec<RouteLeg>,
        waypoint_order: Vec<usize>,
        stopovers: &[bool],
    ) -> Result<Self, DomainError> {
        let waypoint_count = stopovers.len();
        if waypoint_order.len() != waypoint_count {
            return Err(DomainError::InvalidWaypointOrder(format!(
                "expected {waypoint_count} entries, got {}",
                waypoint_order.len()
            )));
        }

        let mut seen = vec![false; waypoint_count];
        for &idx in &waypoint_order {
            match seen.get_mut(idx) {
                None => {
                    return Err(DomainError::InvalidWaypointOrder(format!(
                        "index {idx} out of range for {waypoint_count} waypoints"
                    )));
                }
                Some(true) => {
                    return Err(DomainError::InvalidWaypointOrder(format!(
                        "index {idx} appears more than once"
                    )));
                }
                Some(slot) => *slot = true,
            }
        }

        let waypoint_order: Vec<WaypointIndex> =
            waypoint_order.into_iter().map(WaypointIndex).collect();
        let stops: Vec<WaypointIndex> = waypoint_order
            .iter()
            .copied()
            .filter(|idx| stopovers[idx.0])
            .collect();

        if legs.len() != stops.len() + 1 {
            return Err(DomainError::LegCountMismatch {
                legs: legs.len(),
                stopovers: stops.len(),
            });
        }

        Ok(Self {
            legs,
            waypoint_order,
            stops,
        })
    }

    pub fn legs(&self) -> &[RouteLeg] {
        &self.legs
    }

    /// Visiting order of every waypoint, pass-through ones included.
    pub fn waypoint_order(&self) -> &[WaypointIndex] {
        &self.waypoint_order
    }

    /// Number of intermediate stops.
    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    /// Original waypoint index of the stop visited at `position`.
    pub fn waypoint_at(&self, position: VisitPosition) -> Option<WaypointIndex> {
        self.stops.get(position.0).copied()
    }

    /// Original waypoint index the given leg ends at.
    ///
    /// Leg `i` ends at the stop visited at position `i`; the final leg ends at
    /// the destination and yields `None`.
    pub fn waypoint_for_leg(&self, leg_index: usize) -> Option<WaypointIndex> {
        self.waypoint_at(VisitPosition(leg_index))
    }

    /// Explicit visiting-position → original-index mapping over stopovers.
    pub fn stop_assignments(&self) -> impl Iterator<Item = (VisitPosition, WaypointIndex)> + '_ {
        self.stops
            .iter()
            .enumerate()
            .map(|(pos, idx)| (VisitPosition(pos), *idx))
    }

    /// Sum of valid leg durations in seconds.
    pub fn total_duration_secs(&self) -> i64 {
        self.legs
            .iter()
            .filter_map(RouteLeg::valid_duration)
            .fold(0, i64::saturating_add)
    }

    /// Sum of known non-negative leg distances in metres.
    pub fn total_distance_meters(&self) -> i64 {
        self.legs
            .iter()
            .filter_map(|l| l.distance_meters)
            .filter(|d| *d >= 0)
            .fold(0, i64::saturating_add)
    }
}
