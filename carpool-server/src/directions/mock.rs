//! Mock directions client for development without an API key.
//!
//! Serves recorded directions responses from JSON files. Each request is
//! answered with the first recording whose route has one leg per hop for
//! the requested number of stopovers.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::domain::{OptimizedRoute, Place, Waypoint};

use super::RouteOptimizer;
use super::convert::convert_response;
use super::error::RouteError;
use super::types::DirectionsResponse;

/// Mock directions client that replays recorded responses.
#[derive(Debug, Clone)]
pub struct MockDirections {
    responses: Arc<Vec<DirectionsResponse>>,
}

impl MockDirections {
    /// Load recordings from a JSON file, or from every `.json` file in a
    /// directory (in file name order).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RouteError> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Ok(Self::from_responses(vec![read_response(path)?]));
        }

        let entries = std::fs::read_dir(path)
            .map_err(|e| RouteError::service(format!("failed to read {path:?}: {e}")))?;
        let mut files: Vec<_> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();

        let responses = files
            .iter()
            .map(|file| read_response(file))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = responses.len(), dir = ?path, "Loaded recorded directions");

        Ok(Self::from_responses(responses))
    }

    pub fn from_responses(responses: Vec<DirectionsResponse>) -> Self {
        Self {
            responses: Arc::new(responses),
        }
    }

    fn recording_for(&self, stopover_count: usize) -> Option<&DirectionsResponse> {
        self.responses.iter().find(|r| {
            r.routes
                .first()
                .is_some_and(|route| route.legs.len() == stopover_count + 1)
        })
    }
}

fn read_response(path: &Path) -> Result<DirectionsResponse, RouteError> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| RouteError::service(format!("failed to read {path:?}: {e}")))?;
    serde_json::from_str(&json)
        .map_err(|e| RouteError::service(format!("failed to parse {path:?}: {e}")))
}

impl RouteOptimizer for MockDirections {
    /// Origin and destination are ignored.
    async fn optimize_route(
        &self,
        _origin: &Place,
        _destination: &Place,
        waypoints: &[Waypoint],
    ) -> Result<OptimizedRoute, RouteError> {
        let stopovers = waypoints.iter().filter(|w| w.stopover).count();
        let response = self.recording_for(stopovers).ok_or_else(|| {
            RouteError::service(format!("no recorded route for {stopovers} stopovers"))
        })?;
        convert_response(response, waypoints)
    }
}
