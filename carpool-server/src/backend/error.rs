//! Backend API error types.

/// Errors that can occur when talking to the backend REST API.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Session cookie or CSRF token rejected
    #[error("unauthorized: check the session cookie and CSRF token")]
    Unauthorized,

    /// Record does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// API returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },
}
