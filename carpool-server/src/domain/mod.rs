//! Domain types for the carpool planner.
//!
//! This module contains the core domain model types. Coordinates and routes
//! enforce their invariants at construction time, so code that receives
//! these types can trust their validity.

mod coordinate;
mod error;
mod location;
mod route;
mod schedule;

pub use coordinate::{Coordinate, InvalidCoordinate, Place};
pub use error::DomainError;
pub use location::{LocationRecord, UserId};
pub use route::{
    MAX_LEG_DURATION_SECS, OptimizedRoute, RouteLeg, VisitPosition, Waypoint, WaypointIndex,
};
pub use schedule::{AnchorMode, PickupEntry, PickupSchedule};

#[cfg(test)]
pub(crate) use route::test_support;
