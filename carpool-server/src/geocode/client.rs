//! Nominatim HTTP client.

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::warn;

use crate::domain::Coordinate;

use super::Geocoder;
use super::error::GeocodeError;
use super::types::{ReverseResult, SearchHit};

/// Default base URL for the public Nominatim instance.
const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Nominatim's usage policy requires an identifying User-Agent.
const DEFAULT_USER_AGENT: &str = "carpool-server/0.1";

/// Configuration for the Nominatim client.
#[derive(Debug, Clone)]
pub struct NominatimConfig {
    /// Base URL for the API
    pub base_url: String,
    /// User-Agent header value
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl NominatimConfig {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 10,
        }
    }

    /// Set a custom base URL (for self-hosted instances or testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Client for the Nominatim search and reverse endpoints.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    http: reqwest::Client,
    base_url: String,
}

impl NominatimClient {
    pub fn new(config: NominatimConfig) -> Result<Self, GeocodeError> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&config.user_agent).map_err(|_| GeocodeError::Api {
            status: 0,
            message: "Invalid User-Agent format".to_string(),
        })?;
        headers.insert(USER_AGENT, agent);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Look up the best match for a free-form address.
    pub async fn search(&self, address: &str) -> Result<Coordinate, GeocodeError> {
        let url = format!("{}/search", self.base_url);
        let body = self
            .get_text(&url, &[("format", "jsonv2"), ("limit", "1"), ("q", address)])
            .await?;

        let hits: Vec<SearchHit> =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Json {
                message: e.to_string(),
            })?;

        hits.first()
            .and_then(SearchHit::coordinate)
            .ok_or_else(|| GeocodeError::NoResult {
                query: address.to_string(),
            })
    }

    /// Describe a coordinate as an address.
    pub async fn reverse(&self, coordinate: Coordinate) -> Result<String, GeocodeError> {
        let url = format!("{}/reverse", self.base_url);
        let lat = coordinate.lat().to_string();
        let lon = coordinate.lng().to_string();
        let body = self
            .get_text(&url, &[("format", "jsonv2"), ("lat", lat.as_str()), ("lon", lon.as_str())])
            .await?;

        let result: ReverseResult =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Json {
                message: e.to_string(),
            })?;

        result
            .display_name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| GeocodeError::NoResult {
                query: coordinate.to_string(),
            })
    }

    async fn get_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String, GeocodeError> {
        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response.text().await?)
    }
}

impl Geocoder for NominatimClient {
    async fn geocode(&self, address: &str) -> Option<Coordinate> {
        match self.search(address).await {
            Ok(coordinate) => Some(coordinate),
            Err(e) => {
                warn!(address, error = %e, "Geocoding failed");
                None
            }
        }
    }

    async fn reverse_geocode(&self, coordinate: Coordinate) -> String {
        match self.reverse(coordinate).await {
            Ok(name) => name,
            Err(e) => {
                warn!(coordinate = %coordinate, error = %e, "Reverse geocoding failed");
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = NominatimConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn config_builder() {
        let config = NominatimConfig::new()
            .with_base_url("http://localhost:8088/")
            .with_user_agent("test-agent")
            .with_timeout(2);

        assert_eq!(config.base_url, "http://localhost:8088/");
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.timeout_secs, 2);
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client =
            NominatimClient::new(NominatimConfig::new().with_base_url("http://localhost:8088/"))
                .unwrap();
        assert_eq!(client.base_url, "http://localhost:8088");
    }

    #[test]
    fn rejects_invalid_user_agent() {
        let result = NominatimClient::new(NominatimConfig::new().with_user_agent("bad\nagent"));
        assert!(result.is_err());
    }
}
