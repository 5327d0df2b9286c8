//! Web layer for the carpool server.
//!
//! Exposes the session store, ride requests, ride planning, bookings and
//! link building over HTTP. Handlers return JSON, or an HTML fragment when
//! the client asks for `text/html`.

mod dto;
mod error;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use error::AppError;
pub use routes::create_router;
pub use state::AppState;
