//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::DomainError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Where the UI goes after a failure that needs a fresh login.
pub const LOGIN_FORM: &str = "/login";

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Domain errors (4xx)
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Request body that could not be read at all
    #[error("Malformed request: {0}")]
    BadRequest(String),

    // Server errors (5xx)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Domain error inside, if any
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            AppError::Domain(err) => Some(err),
            _ => None,
        }
    }

    /// Attach the form the failed request came from
    pub fn on(self, form: &'static str) -> Rejection {
        Rejection { error: self, form }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts_remaining: Option<u8>,
    /// UI state to re-prompt
    pub return_to: String,
}

/// An error bound to the form that produced it.
#[derive(Debug)]
pub struct Rejection {
    pub error: AppError,
    pub form: &'static str,
}

impl Rejection {
    /// The form the user is sent back to
    pub fn return_to(&self) -> &'static str {
        match &self.error {
            AppError::Domain(err) if err.requires_login() => LOGIN_FORM,
            _ => self.form,
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let return_to = self.return_to();

        let (status, error_code, details, attempts_remaining) = match &self.error {
            AppError::Domain(domain_err) => match domain_err {
                // 404 Not Found
                DomainError::NotFound(name) => {
                    (StatusCode::NOT_FOUND, "not_found", Some(name.clone()), None)
                }

                // 401 Unauthorized
                DomainError::InvalidPin { remaining, .. } => {
                    (StatusCode::UNAUTHORIZED, "invalid_pin", None, Some(*remaining))
                }
                DomainError::Unauthenticated => {
                    (StatusCode::UNAUTHORIZED, "unauthenticated", None, None)
                }

                // 429 Too Many Requests
                DomainError::TooManyAttempts => {
                    (StatusCode::TOO_MANY_REQUESTS, "too_many_attempts", None, Some(0))
                }

                // 400 Bad Request
                DomainError::InvalidAmount(msg) => {
                    (StatusCode::BAD_REQUEST, "invalid_amount", Some(msg.clone()), None)
                }
                DomainError::InvalidDenomination(amount) => (
                    StatusCode::BAD_REQUEST,
                    "invalid_denomination",
                    Some(amount.to_string()),
                    None,
                ),
                DomainError::InvalidSelection(code) => {
                    (StatusCode::BAD_REQUEST, "invalid_selection", Some(code.clone()), None)
                }
                DomainError::InsufficientFunds { .. } => {
                    (StatusCode::BAD_REQUEST, "insufficient_funds", None, None)
                }
                DomainError::InvalidPinFormat => {
                    (StatusCode::BAD_REQUEST, "invalid_pin_format", None, None)
                }
            },

            AppError::BadRequest(reason) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(reason.clone()), None)
            }

            // 500 Internal Server Error
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None, None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None, None)
            }
        };

        // Never echo driver messages back to the client.
        let error = if status.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.error.to_string()
        };

        let body = ErrorResponse {
            error,
            error_code: error_code.to_string(),
            details,
            attempts_remaining,
            return_to: return_to.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.on(LOGIN_FORM).into_response()
    }
}
