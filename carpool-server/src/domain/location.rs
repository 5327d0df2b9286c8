//! Rider location requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Coordinate;

/// Backend identifier of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored rider request.
///
/// Records are append-only on the backend; the core only reads and filters
/// them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub user_id: UserId,
    pub start: Coordinate,
    pub end: Coordinate,
    pub pickup_address: String,
    pub dropoff_address: String,
    pub requested_at: DateTime<Utc>,
}
