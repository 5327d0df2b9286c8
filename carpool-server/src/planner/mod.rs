//! Ride planning.
//!
//! Ties the core together for the driver flow: match ride requests on the
//! driver's destination, ask the directions service for an optimized route
//! through the riders' pickup points, schedule the pickups, and map every
//! pickup back to the rider it belongs to.

mod config;
mod plan;
mod request;

#[cfg(test)]
mod plan_tests;

pub use config::PlannerConfig;
pub use plan::{PlanError, PlannedStop, RidePlan, RideRequest, plan_ride};
pub use request::validate_ride_request;
