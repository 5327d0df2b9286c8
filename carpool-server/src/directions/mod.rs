//! Route optimizer adapter.
//!
//! Wraps a driving-directions service that reorders waypoints for minimal
//! travel. The service's optimization heuristic is treated as an oracle: it
//! returns a visiting order and per-leg timings, and this module validates
//! and converts them.
//!
//! Key characteristics of the service:
//! - `waypoint_order[i]` is the input index of the stop visited i-th
//! - one leg per hop, so `legs == waypoints + 1`
//! - `ZERO_RESULTS`/`NOT_FOUND` mean the places cannot be connected by road

mod client;
mod convert;
mod error;
mod mock;
mod retry;
mod types;

use std::future::Future;

use crate::domain::{OptimizedRoute, Place, Waypoint};

pub use client::{DirectionsClient, DirectionsConfig};
pub use convert::convert_response;
pub use error::RouteError;
pub use mock::MockDirections;
pub use retry::{RetryPolicy, optimize_with_retry};
pub use types::{DirectionsResponse, LatLngDto, LegDto, RouteDto, TextValue};

/// A service that produces an optimized driving route.
///
/// This abstraction allows the planner to be tested with mock data.
pub trait RouteOptimizer {
    /// Request a route from `origin` to `destination` through `waypoints`,
    /// with the waypoints reordered for minimal travel.
    fn optimize_route(
        &self,
        origin: &Place,
        destination: &Place,
        waypoints: &[Waypoint],
    ) -> impl Future<Output = Result<OptimizedRoute, RouteError>> + Send;
}

/// The optimizer chosen at startup.
#[derive(Debug, Clone)]
pub enum DirectionsProvider {
    Live(DirectionsClient),
    Mock(MockDirections),
}

impl RouteOptimizer for DirectionsProvider {
    async fn optimize_route(
        &self,
        origin: &Place,
        destination: &Place,
        waypoints: &[Waypoint],
    ) -> Result<OptimizedRoute, RouteError> {
        match self {
            DirectionsProvider::Live(client) => {
                client.optimize_route(origin, destination, waypoints).await
            }
            DirectionsProvider::Mock(mock) => {
                mock.optimize_route(origin, destination, waypoints).await
            }
        }
    }
}
