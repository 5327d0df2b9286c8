//! Backend API DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{Coordinate, LocationRecord, UserId};

/// A ride request as stored by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub user: u64,
    pub start_latitude: f64,
    pub start_longitude: f64,
    pub end_latitude: f64,
    pub end_longitude: f64,
    #[serde(default)]
    pub pickup_address: String,
    #[serde(default)]
    pub dropoff_address: String,
    pub requested_datetime: DateTime<Utc>,
}

impl LocationDto {
    /// Validate into a domain record. `None` if a coordinate is out of range.
    pub fn to_record(&self) -> Option<LocationRecord> {
        Some(LocationRecord {
            user_id: UserId(self.user),
            start: Coordinate::new(self.start_latitude, self.start_longitude).ok()?,
            end: Coordinate::new(self.end_latitude, self.end_longitude).ok()?,
            pickup_address: self.pickup_address.clone(),
            dropoff_address: self.dropoff_address.clone(),
            requested_at: self.requested_datetime,
        })
    }
}

impl From<&LocationRecord> for LocationDto {
    fn from(record: &LocationRecord) -> Self {
        Self {
            id: None,
            user: record.user_id.0,
            start_latitude: record.start.lat(),
            start_longitude: record.start.lng(),
            end_latitude: record.end.lat(),
            end_longitude: record.end.lng(),
            pickup_address: record.pickup_address.clone(),
            dropoff_address: record.dropoff_address.clone(),
            requested_datetime: record.requested_at,
        }
    }
}

/// Convert backend rows, skipping (and logging) invalid ones.
pub fn convert_locations(rows: &[LocationDto]) -> Vec<LocationRecord> {
    rows.iter()
        .filter_map(|row| {
            let record = row.to_record();
            if record.is_none() {
                warn!(id = ?row.id, user = row.user, "Skipping location with invalid coordinates");
            }
            record
        })
        .collect()
}

/// Parse raw backend rows, skipping (and logging) rows that are malformed
/// or carry invalid coordinates.
pub fn parse_locations(rows: Vec<serde_json::Value>) -> Vec<LocationRecord> {
    let dtos: Vec<LocationDto> = rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value(row) {
            Ok(dto) => Some(dto),
            Err(e) => {
                warn!(error = %e, "Skipping malformed location row");
                None
            }
        })
        .collect();
    convert_locations(&dtos)
}

/// Filter for listing ride requests.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LocationFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<u64>,
    /// Only requests at or after this instant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_after: Option<DateTime<Utc>>,
}

/// A passenger on a booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingPassenger {
    pub user: u64,
    pub pickup_address: String,
    pub pickup_time: DateTime<Utc>,
}

/// Body for creating a booking.
#[derive(Debug, Clone, Serialize)]
pub struct NewBooking {
    pub driver: u64,
    pub passengers: Vec<BookingPassenger>,
    pub route_link: String,
    pub departure_time: Option<DateTime<Utc>>,
    pub arrival_time: Option<DateTime<Utc>>,
}

/// A booking as returned by the backend; also a trip-history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingDto {
    pub id: u64,
    pub driver: u64,
    #[serde(default)]
    pub passengers: Vec<BookingPassenger>,
    #[serde(default)]
    pub route_link: String,
    pub departure_time: Option<DateTime<Utc>>,
    pub arrival_time: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Partial update of a booking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passengers: Option<Vec<BookingPassenger>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<DateTime<Utc>>,
}

/// A user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub phone_number: Option<String>,
}

/// Partial update of a user profile; unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}
