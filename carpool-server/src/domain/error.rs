//! Domain error types.
//!
//! These errors represent validation failures on data coming back from
//! external services. They are distinct from API/IO errors.

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Waypoint order is not a permutation of the input indices
    #[error("invalid waypoint order: {0}")]
    InvalidWaypointOrder(String),

    /// Route does not have one leg per stopover plus one
    #[error("route has {legs} legs for {stopovers} stopovers (expected stopovers + 1)")]
    LegCountMismatch { legs: usize, stopovers: usize },
}
