//! Error types for web handlers.
//!
//! Bridges the domain error taxonomy to HTTP responses via Axum's
//! `IntoResponse`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use eventease_core::TicketingError;
use serde::Serialize;

/// Application error type for web handlers.
///
/// Wraps domain errors and provides HTTP-friendly responses: each failure
/// carries a status, a human-readable message and a machine-readable code
/// for client error handling.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    code: String,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
        }
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            message.into(),
            "BAD_REQUEST".to_string(),
        )
    }

    /// Create a 401 Unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            message.into(),
            "UNAUTHORIZED".to_string(),
        )
    }

    /// Create a 403 Forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            message.into(),
            "FORBIDDEN".to_string(),
        )
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_ERROR".to_string(),
        )
    }

    /// HTTP status of this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable code of this error.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

/// JSON body returned for every failure.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            code: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<TicketingError> for AppError {
    fn from(err: TicketingError) -> Self {
        let status = match &err {
            TicketingError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            TicketingError::NotFound { .. } => StatusCode::NOT_FOUND,
            TicketingError::InsufficientInventory { .. }
            | TicketingError::InsufficientFunds { .. }
            | TicketingError::InvalidPaymentMethod { .. } => StatusCode::BAD_REQUEST,
            TicketingError::NotEligibleForResale { .. }
            | TicketingError::DuplicateWaitlistEntry
            | TicketingError::CategoryMismatch { .. }
            | TicketingError::ConcurrencyConflict => StatusCode::CONFLICT,
            TicketingError::NotOwner => StatusCode::FORBIDDEN,
            TicketingError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string(), err.code().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventease_core::types::TicketCategory;

    #[test]
    fn domain_errors_map_to_expected_statuses() {
        let cases = [
            (
                TicketingError::validation("bad input"),
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
            ),
            (
                TicketingError::not_found("event", "x"),
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
            ),
            (
                TicketingError::InsufficientInventory {
                    category: TicketCategory::Vip,
                    remaining: 0,
                },
                StatusCode::BAD_REQUEST,
                "INSUFFICIENT_INVENTORY",
            ),
            (
                TicketingError::InsufficientFunds {
                    required: 100,
                    available: 0,
                },
                StatusCode::BAD_REQUEST,
                "INSUFFICIENT_FUNDS",
            ),
            (
                TicketingError::DuplicateWaitlistEntry,
                StatusCode::CONFLICT,
                "DUPLICATE_WAITLIST_ENTRY",
            ),
            (
                TicketingError::ConcurrencyConflict,
                StatusCode::CONFLICT,
                "CONCURRENCY_CONFLICT",
            ),
            (TicketingError::NotOwner, StatusCode::FORBIDDEN, "NOT_OWNER"),
        ];

        for (err, status, code) in cases {
            let app_err = AppError::from(err);
            assert_eq!(app_err.status(), status);
            assert_eq!(app_err.code(), code);
        }
    }
}
