//! Pickup schedule types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which end of the trip the anchor instant refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorMode {
    /// The anchor is when the driver leaves the origin.
    #[default]
    Departure,
    /// The anchor is when the driver must reach the destination.
    Arrival,
}

/// A pickup time for the stop at the end of one route leg.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PickupEntry {
    /// Index of the leg in the route this entry was computed from.
    pub leg_index: usize,
    pub label: String,
    pub pickup_at: DateTime<Utc>,
}

/// Result of scheduling pickups along a route.
///
/// Entries are in traversal order but are not positionally aligned with the
/// route legs when any leg was skipped; use [`PickupEntry::leg_index`].
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PickupSchedule {
    pub entries: Vec<PickupEntry>,
    /// Legs excluded because their duration was missing or non-positive.
    pub skipped_legs: Vec<usize>,
}

impl PickupSchedule {
    /// True when one or more legs were skipped.
    pub fn is_partial(&self) -> bool {
        !self.skipped_legs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the entry for a given route leg.
    pub fn for_leg(&self, leg_index: usize) -> Option<&PickupEntry> {
        self.entries.iter().find(|e| e.leg_index == leg_index)
    }
}
