//! Backend REST API client.
//!
//! The backend owns ride requests (location records), bookings and user
//! profiles. Every request carries the CSRF header and session cookie; this
//! module does not implement authentication itself.

mod client;
mod error;
#[cfg(test)]
pub(crate) mod test_support;
mod types;

pub use client::{BackendClient, BackendConfig};
pub use error::BackendError;
pub use types::{
    BookingDto, BookingPassenger, BookingUpdate, LocationDto, LocationFilter, NewBooking,
    UserPatch, UserProfile, convert_locations, parse_locations,
};
