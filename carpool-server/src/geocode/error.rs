//! Geocoding error types.
//!
//! These never cross the [`Geocoder`](super::Geocoder) boundary; they are
//! logged and turned into an empty result.

/// Errors from the Nominatim HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response could not be parsed
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Service returned no usable result
    #[error("no result for {query}")]
    NoResult { query: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = GeocodeError::NoResult {
            query: "nowhere".into(),
        };
        assert_eq!(err.to_string(), "no result for nowhere");

        let err = GeocodeError::Api {
            status: 429,
            message: "slow down".into(),
        };
        assert_eq!(err.to_string(), "API error 429: slow down");
    }
}
