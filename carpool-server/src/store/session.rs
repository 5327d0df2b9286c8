//! Per-session trip state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Coordinate, UserId};

use super::coordinates::{CoordinateStore, SessionId};
use super::error::StoreError;

pub const START_COORDINATES_KEY: &str = "startCoordinates";
pub const END_COORDINATES_KEY: &str = "endCoordinates";
pub const SELECTED_PASSENGERS_KEY: &str = "selectedPassengerDetails";
pub const PLANNED_TRIP_KEY: &str = "plannedTrip";

/// A passenger the driver has chosen to pick up, with their scheduled time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassengerSelection {
    pub user_id: UserId,
    pub pickup_address: String,
    pub dropoff_address: String,
    pub pickup_at: DateTime<Utc>,
}

/// The route a passenger selection was planned on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedTrip {
    pub share_link: String,
    pub departs_at: DateTime<Utc>,
    pub arrives_at: DateTime<Utc>,
}

/// The trip state of one session, passed explicitly to the code that needs it.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    pub id: SessionId,
    pub start: Option<Coordinate>,
    pub end: Option<Coordinate>,
    pub selected_passengers: Vec<PassengerSelection>,
    /// Set together with `selected_passengers` by planning.
    pub planned_trip: Option<PlannedTrip>,
}

impl SessionContext {
    /// An empty context for a session.
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            start: None,
            end: None,
            selected_passengers: Vec::new(),
            planned_trip: None,
        }
    }

    /// Load the stored state of a session.
    pub fn load(store: &CoordinateStore, id: SessionId) -> Result<Self, StoreError> {
        Ok(Self {
            start: store.get(&id, START_COORDINATES_KEY)?,
            end: store.get(&id, END_COORDINATES_KEY)?,
            selected_passengers: store
                .get(&id, SELECTED_PASSENGERS_KEY)?
                .unwrap_or_default(),
            planned_trip: store.get(&id, PLANNED_TRIP_KEY)?,
            id,
        })
    }

    /// Persist every field; `None` fields are removed from the store.
    pub fn save(&self, store: &CoordinateStore) -> Result<(), StoreError> {
        match &self.start {
            Some(c) => store.set(&self.id, START_COORDINATES_KEY, c)?,
            None => store.remove(&self.id, START_COORDINATES_KEY)?,
        }
        match &self.end {
            Some(c) => store.set(&self.id, END_COORDINATES_KEY, c)?,
            None => store.remove(&self.id, END_COORDINATES_KEY)?,
        }
        match &self.planned_trip {
            Some(trip) => store.set(&self.id, PLANNED_TRIP_KEY, trip)?,
            None => store.remove(&self.id, PLANNED_TRIP_KEY)?,
        }
        if self.selected_passengers.is_empty() {
            store.remove(&self.id, SELECTED_PASSENGERS_KEY)
        } else {
            store.set(&self.id, SELECTED_PASSENGERS_KEY, &self.selected_passengers)
        }
    }

    /// Drop the selection and the trip it was planned on.
    pub fn clear_plan(&mut self) {
        self.selected_passengers.clear();
        self.planned_trip = None;
    }

    /// Reset after a booking is submitted or the user navigates away.
    pub fn clear(&mut self, store: &CoordinateStore) -> Result<(), StoreError> {
        self.start = None;
        self.end = None;
        self.clear_plan();
        store.clear(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreConfig;
    use tempfile::tempdir;

    fn sid() -> SessionId {
        SessionId::parse("driver-1").unwrap()
    }

    fn selection() -> PassengerSelection {
        PassengerSelection {
            user_id: UserId(42),
            pickup_address: "1 Main St".into(),
            dropoff_address: "Campus".into(),
            pickup_at: DateTime::from_timestamp(1_700_000_300, 0).unwrap(),
        }
    }

    fn trip() -> PlannedTrip {
        PlannedTrip {
            share_link: "https://www.google.com/maps/dir/?api=1".into(),
            departs_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            arrives_at: DateTime::from_timestamp(1_700_001_800, 0).unwrap(),
        }
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let store = CoordinateStore::new(StoreConfig::new(dir.path()));

        let mut ctx = SessionContext::new(sid());
        ctx.start = Some(Coordinate::new(29.6516, -82.3248).unwrap());
        ctx.end = Some(Coordinate::new(29.6, -82.4).unwrap());
        ctx.selected_passengers.push(selection());
        ctx.planned_trip = Some(trip());
        ctx.save(&store).unwrap();

        let loaded = SessionContext::load(&store, sid()).unwrap();
        assert_eq!(loaded, ctx);
    }

    #[test]
    fn uses_well_known_keys() {
        let dir = tempdir().unwrap();
        let store = CoordinateStore::new(StoreConfig::new(dir.path()));
        let mut ctx = SessionContext::new(sid());
        ctx.start = Some(Coordinate::new(1.0, 2.0).unwrap());
        ctx.save(&store).unwrap();

        let raw: Option<Coordinate> = store.get(&sid(), "startCoordinates").unwrap();
        assert_eq!(raw, ctx.start);
    }

    #[test]
    fn saving_none_removes_key() {
        let dir = tempdir().unwrap();
        let store = CoordinateStore::new(StoreConfig::new(dir.path()));
        let mut ctx = SessionContext::new(sid());
        ctx.end = Some(Coordinate::new(1.0, 2.0).unwrap());
        ctx.save(&store).unwrap();

        ctx.end = None;
        ctx.save(&store).unwrap();
        assert_eq!(SessionContext::load(&store, sid()).unwrap().end, None);
    }

    #[test]
    fn clear_plan_keeps_endpoints() {
        let dir = tempdir().unwrap();
        let store = CoordinateStore::new(StoreConfig::new(dir.path()));
        let mut ctx = SessionContext::new(sid());
        ctx.start = Some(Coordinate::new(1.0, 2.0).unwrap());
        ctx.selected_passengers.push(selection());
        ctx.planned_trip = Some(trip());
        ctx.save(&store).unwrap();

        ctx.clear_plan();
        ctx.save(&store).unwrap();

        let loaded = SessionContext::load(&store, sid()).unwrap();
        assert_eq!(loaded.start, ctx.start);
        assert!(loaded.selected_passengers.is_empty());
        assert_eq!(loaded.planned_trip, None);
        assert_eq!(store.get::<PlannedTrip>(&sid(), PLANNED_TRIP_KEY).unwrap(), None);
    }

    #[test]
    fn clear_resets_state_and_store() {
        let dir = tempdir().unwrap();
        let store = CoordinateStore::new(StoreConfig::new(dir.path()));
        let mut ctx = SessionContext::new(sid());
        ctx.start = Some(Coordinate::new(1.0, 2.0).unwrap());
        ctx.selected_passengers.push(selection());
        ctx.planned_trip = Some(trip());
        ctx.save(&store).unwrap();

        ctx.clear(&store).unwrap();
        assert!(ctx.start.is_none());
        assert!(ctx.selected_passengers.is_empty());
        assert!(ctx.planned_trip.is_none());
        assert_eq!(SessionContext::load(&store, sid()).unwrap(), SessionContext::new(sid()));
    }
}
