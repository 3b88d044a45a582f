//! Server error types with HTTP status code mapping.
//!
//! [`AppError`] is the central error type. Each variant maps to a specific
//! HTTP status code and structured JSON error response. Server-side
//! failures are logged in full and reported to the client with a generic
//! message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1201,
///     "message": "forbidden: route requires role Admin",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`AppError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                    |
/// |-----------|-----------------|--------------------------------|
/// | 1000–1099 | Validation      | 400 Bad Request                |
/// | 1100–1199 | Authentication  | 401 Unauthorized               |
/// | 1200–1299 | Authorization   | 403 Forbidden                  |
/// | 2000–2099 | Not Found       | 404 Not Found                  |
/// | 2100–2199 | State conflict  | 409 Conflict                   |
/// | 3000–3999 | Server          | 500 / 502                      |
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Missing, malformed, unknown or expired bearer token.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but not allowed to perform this action.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A referenced document does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of document (e.g. `"tuition"`).
        entity: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// The request conflicts with the current state of a document.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Payment provider failure (network, auth, or provider-side error).
    #[error("payment provider error: {0}")]
    PaymentProvider(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for [`AppError::NotFound`].
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::Unauthorized(_) => 1101,
            Self::Forbidden(_) => 1201,
            Self::NotFound { .. } => 2001,
            Self::Conflict(_) => 2101,
            Self::Internal(_) => 3000,
            Self::Persistence(_) => 3001,
            Self::PaymentProvider(_) => 3002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Persistence(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::PaymentProvider(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Message safe to show to clients. Server-side details stay in logs.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Persistence(_) | Self::Internal(_) => "internal server error".to_string(),
            Self::PaymentProvider(_) => "payment provider unavailable".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::PaymentProvider(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.public_message(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
