//! Directions API HTTP client.
//!
//! Requests a driving route with `optimize:true` so the service reorders the
//! waypoints for minimal travel time, and converts the answer to an
//! [`OptimizedRoute`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::debug;

use crate::domain::{OptimizedRoute, Place, Waypoint};

use super::RouteOptimizer;
use super::convert::convert_response;
use super::error::RouteError;
use super::types::DirectionsResponse;

/// Default base URL for the directions API.
const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Configuration for the directions client.
#[derive(Debug, Clone)]
pub struct DirectionsConfig {
    /// API key sent as the `key` query parameter
    pub api_key: String,
    /// Endpoint URL (defaults to the production API)
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl DirectionsConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 15,
        }
    }

    /// Set a custom endpoint (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Directions API client.
///
/// Uses a semaphore to limit concurrent requests and avoid quota errors.
#[derive(Debug, Clone)]
pub struct DirectionsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    semaphore: Arc<Semaphore>,
}

impl DirectionsClient {
    /// Create a new client with the given configuration.
    pub fn new(config: DirectionsConfig) -> Result<Self, RouteError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            api_key: config.api_key,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    /// Fetch the raw response (for debugging/testing).
    pub async fn get_directions_raw(
        &self,
        origin: &Place,
        destination: &Place,
        waypoints: &[Waypoint],
    ) -> Result<DirectionsResponse, RouteError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| RouteError::service("semaphore closed"))?;

        let query = build_query(origin, destination, waypoints, &self.api_key);
        let response = self.http.get(&self.base_url).query(&query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RouteError::service(format!(
                "API error {}: {}",
                status.as_u16(),
                body.chars().take(200).collect::<String>()
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            RouteError::service(format!(
                "JSON parse error: {e} (body: {})",
                body.chars().take(500).collect::<String>()
            ))
        })
    }
}

impl RouteOptimizer for DirectionsClient {
    async fn optimize_route(
        &self,
        origin: &Place,
        destination: &Place,
        waypoints: &[Waypoint],
    ) -> Result<OptimizedRoute, RouteError> {
        let response = self
            .get_directions_raw(origin, destination, waypoints)
            .await?;
        let route = convert_response(&response, waypoints)?;

        debug!(
            waypoints = waypoints.len(),
            legs = route.legs().len(),
            duration_secs = route.total_duration_secs(),
            "Optimized route"
        );

        Ok(route)
    }
}

/// Query parameters for a driving request with waypoint optimization.
fn build_query(
    origin: &Place,
    destination: &Place,
    waypoints: &[Waypoint],
    api_key: &str,
) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("origin", origin.to_query_value()),
        ("destination", destination.to_query_value()),
        ("mode", "driving".to_string()),
    ];

    if !waypoints.is_empty() {
        let mut value = String::from("optimize:true");
        for waypoint in waypoints {
            value.push('|');
            if !waypoint.stopover {
                value.push_str("via:");
            }
            value.push_str(&waypoint.location.to_query_value());
        }
        query.push(("waypoints", value));
    }

    query.push(("key", api_key.to_string()));
    query
}
