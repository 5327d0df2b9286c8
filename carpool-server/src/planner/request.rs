//! Rider request validation.

use tracing::info;

use crate::directions::{RetryPolicy, RouteError, RouteOptimizer, optimize_with_retry};
use crate::domain::{LocationRecord, OptimizedRoute, Place};

/// Check that a rider's trip can be driven before it is stored.
///
/// Returns the direct route on success so callers can show an estimate.
pub async fn validate_ride_request<O: RouteOptimizer + Sync>(
    optimizer: &O,
    record: &LocationRecord,
    retry: &RetryPolicy,
) -> Result<OptimizedRoute, RouteError> {
    let route = optimize_with_retry(
        optimizer,
        &Place::Coordinate(record.start),
        &Place::Coordinate(record.end),
        &[],
        retry,
    )
    .await?;

    info!(
        user = %record.user_id,
        duration_secs = route.total_duration_secs(),
        "Validated ride request"
    );

    Ok(route)
}
