//! Backend REST client.

use reqwest::header::{COOKIE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::domain::LocationRecord;

use super::error::BackendError;
use super::types::{
    BookingDto, BookingUpdate, LocationDto, LocationFilter, NewBooking, UserPatch, UserProfile,
    parse_locations,
};

/// Default base URL for a locally running backend.
const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Header carrying the CSRF token.
const CSRF_HEADER: &str = "x-csrftoken";

/// Configuration for the backend client.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL for the API
    pub base_url: String,
    /// CSRF token echoed in the `X-CSRFToken` header
    pub csrf_token: String,
    /// Session cookie value
    pub session_cookie: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl BackendConfig {
    pub fn new(csrf_token: impl Into<String>, session_cookie: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            csrf_token: csrf_token.into(),
            session_cookie: session_cookie.into(),
            timeout_secs: 10,
        }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Client for the carpool backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Create a new backend client.
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();

        let invalid = |what: &str| BackendError::Api {
            status: 0,
            message: format!("Invalid {what} format"),
        };

        let csrf = HeaderValue::from_str(&config.csrf_token).map_err(|_| invalid("CSRF token"))?;
        headers.insert(HeaderName::from_static(CSRF_HEADER), csrf);

        let cookie = format!(
            "csrftoken={}; sessionid={}",
            config.csrf_token, config.session_cookie
        );
        let cookie = HeaderValue::from_str(&cookie).map_err(|_| invalid("session cookie"))?;
        headers.insert(COOKIE, cookie);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    // ------------------------------------------------------------------
    // Locations
    // ------------------------------------------------------------------

    /// List ride requests, dropping malformed rows.
    pub async fn list_locations(
        &self,
        filter: &LocationFilter,
    ) -> Result<Vec<LocationRecord>, BackendError> {
        let rows: Vec<serde_json::Value> = self
            .send(self.request(Method::GET, "locations/").query(filter), "locations")
            .await?;
        Ok(parse_locations(rows))
    }

    /// Store a new ride request.
    pub async fn create_location(&self, record: &LocationRecord) -> Result<LocationDto, BackendError> {
        let body = LocationDto::from(record);
        self.send(self.request(Method::POST, "locations/").json(&body), "location")
            .await
    }

    // ------------------------------------------------------------------
    // Bookings
    // ------------------------------------------------------------------

    /// Trip history for a user (as driver or passenger).
    pub async fn list_bookings(&self, user: u64) -> Result<Vec<BookingDto>, BackendError> {
        self.send(
            self.request(Method::GET, "bookings/").query(&[("user", user)]),
            "bookings",
        )
        .await
    }

    pub async fn get_booking(&self, id: u64) -> Result<BookingDto, BackendError> {
        let path = format!("bookings/{id}/");
        self.send(self.request(Method::GET, &path), &format!("booking {id}"))
            .await
    }

    /// Create a booking.
    ///
    /// Not idempotent: callers must not retry this blindly.
    pub async fn create_booking(&self, booking: &NewBooking) -> Result<BookingDto, BackendError> {
        self.send(self.request(Method::POST, "bookings/").json(booking), "booking")
            .await
    }

    pub async fn update_booking(
        &self,
        id: u64,
        update: &BookingUpdate,
    ) -> Result<BookingDto, BackendError> {
        let path = format!("bookings/{id}/");
        self.send(
            self.request(Method::PUT, &path).json(update),
            &format!("booking {id}"),
        )
        .await
    }

    // ------------------------------------------------------------------
    // User profile
    // ------------------------------------------------------------------

    pub async fn get_user(&self, id: u64) -> Result<UserProfile, BackendError> {
        let path = format!("users/{id}/");
        self.send(self.request(Method::GET, &path), &format!("user {id}"))
            .await
    }

    /// Replace a profile.
    pub async fn update_user(&self, profile: &UserProfile) -> Result<UserProfile, BackendError> {
        let path = format!("users/{}/", profile.id);
        self.send(
            self.request(Method::PUT, &path).json(profile),
            &format!("user {}", profile.id),
        )
        .await
    }

    /// Change selected profile fields.
    pub async fn patch_user(&self, id: u64, patch: &UserPatch) -> Result<UserProfile, BackendError> {
        let path = format!("users/{id}/");
        self.send(
            self.request(Method::PATCH, &path).json(patch),
            &format!("user {id}"),
        )
        .await
    }

    pub async fn delete_user(&self, id: u64) -> Result<(), BackendError> {
        let path = format!("users/{id}/");
        let response = self.request(Method::DELETE, &path).send().await?;
        check_status(response, &format!("user {id}")).await?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T, BackendError> {
        let response = check_status(request.send().await?, what).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| BackendError::Json {
            message: e.to_string(),
        })
    }
}

async fn check_status(
    response: reqwest::Response,
    what: &str,
) -> Result<reqwest::Response, BackendError> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(BackendError::Unauthorized);
    }

    if status == StatusCode::NOT_FOUND {
        return Err(BackendError::NotFound(what.to_string()));
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(BackendError::Api {
            status: status.as_u16(),
            message: body,
        });
    }

    Ok(response)
}
