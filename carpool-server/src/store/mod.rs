//! Durable client-side state.
//!
//! Keeps each session's chosen start/end coordinates and the in-progress
//! passenger selection in a small key-value file, so a half-finished trip
//! survives a restart. Code reads this state through an explicit
//! [`SessionContext`] rather than global lookups.

mod coordinates;
mod error;
mod session;

pub use coordinates::{CoordinateStore, SessionId, StoreConfig};
pub use error::StoreError;
pub use session::{
    END_COORDINATES_KEY, PLANNED_TRIP_KEY, PassengerSelection, PlannedTrip,
    SELECTED_PASSENGERS_KEY, START_COORDINATES_KEY, SessionContext,
};
