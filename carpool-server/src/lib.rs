//! Carpool server.
//!
//! Matches riders whose trips end near a driver's destination, asks a
//! directions service for the best pickup order, schedules the pickups and
//! produces a Google Maps link for the whole route.

pub mod backend;
pub mod cache;
pub mod config;
pub mod directions;
pub mod domain;
pub mod geocode;
pub mod link;
pub mod matcher;
pub mod planner;
pub mod scheduler;
pub mod store;
pub mod web;
