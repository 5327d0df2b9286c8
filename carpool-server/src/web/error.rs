//! HTTP error mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use crate::backend::BackendError;
use crate::directions::RouteError;
use crate::link::LinkError;
use crate::planner::PlanError;
use crate::store::StoreError;

use super::dto::ErrorResponse;

/// Application error type.
#[derive(Debug, PartialEq)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    /// The request was understood but cannot be served, e.g. no road route.
    Unprocessable { message: String },
    /// An upstream service failed.
    Upstream { message: String },
    Internal { message: String },
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Unprocessable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::BadRequest { message }
            | AppError::NotFound { message }
            | AppError::Unprocessable { message }
            | AppError::Upstream { message }
            | AppError::Internal { message } => message,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest {
            message: message.into(),
        }
    }
}

impl From<RouteError> for AppError {
    fn from(e: RouteError) -> Self {
        match e {
            RouteError::Unreachable { .. } => AppError::Unprocessable {
                message: e.to_string(),
            },
            RouteError::ServiceFailure { .. } => AppError::Upstream {
                message: e.to_string(),
            },
        }
    }
}

impl From<PlanError> for AppError {
    fn from(e: PlanError) -> Self {
        match e {
            PlanError::MissingCoordinates(_) => AppError::BadRequest {
                message: e.to_string(),
            },
            PlanError::MatchNotFound(_) => AppError::NotFound {
                message: "no matches".to_string(),
            },
            PlanError::Route(route) => route.into(),
            PlanError::Link(_) => AppError::Unprocessable {
                message: e.to_string(),
            },
        }
    }
}

impl From<LinkError> for AppError {
    fn from(e: LinkError) -> Self {
        AppError::Unprocessable {
            message: e.to_string(),
        }
    }
}

impl From<BackendError> for AppError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::NotFound(_) => AppError::NotFound {
                message: e.to_string(),
            },
            _ => AppError::Upstream {
                message: e.to_string(),
            },
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InvalidSession(_) => AppError::BadRequest {
                message: e.to_string(),
            },
            _ => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, message = self.message(), "Request failed");
        } else {
            warn!(%status, message = self.message(), "Request rejected");
        }

        let body = Json(ErrorResponse {
            error: self.message().to_string(),
        });
        (status, body).into_response()
    }
}
