//! Directions adapter error types.

use std::fmt;

/// Errors from route optimization.
///
/// `Unreachable` is a property of the request (the addresses cannot be
/// connected by road) and must not be retried. `ServiceFailure` covers
/// everything transient or on the service's side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// The service found no drivable route between the points
    Unreachable { status: String },

    /// Network, timeout, quota, or malformed-response failure
    ServiceFailure { message: String },
}

impl RouteError {
    pub fn service(message: impl Into<String>) -> Self {
        RouteError::ServiceFailure {
            message: message.into(),
        }
    }

    /// Whether a retry could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RouteError::ServiceFailure { .. })
    }
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::Unreachable { status } => {
                write!(f, "no drivable route between the given locations ({status})")
            }
            RouteError::ServiceFailure { message } => {
                write!(f, "directions service failure: {message}")
            }
        }
    }
}

impl std::error::Error for RouteError {}

impl From<reqwest::Error> for RouteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RouteError::service(format!("request timed out: {err}"))
        } else {
            RouteError::service(format!("HTTP error: {err}"))
        }
    }
}
