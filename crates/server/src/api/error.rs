//! Mapping of handler failures to JSON error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt::Display;
use ticketdesk_core::StoreError;
use tracing::error;

/// Error envelope returned by every failing route
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A failed request: status plus the client-facing message.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Log `cause` and answer with the generic `message` only.
    pub fn internal(message: &str, cause: impl Display) -> Self {
        error!("{}: {}", message, cause);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Map a store failure the handler has no more specific answer for.
    pub fn from_store(message: &str, err: StoreError) -> Self {
        if err.is_internal() {
            return Self::internal(message, err);
        }
        let status = match err {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Conflict(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::UNAUTHORIZED,
        };
        Self::new(status, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_hides_cause() {
        let err = ApiError::internal("Fehler beim Laden der Daten", "disk on fire");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Fehler beim Laden der Daten");
    }

    #[test]
    fn test_from_store_classes() {
        let err = ApiError::from_store("ctx", StoreError::Database("locked".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "ctx");

        let err = ApiError::from_store("ctx", StoreError::Conflict("Design".to_string()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let err = ApiError::from_store("ctx", StoreError::ticket_not_found(1));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        let err = ApiError::from_store("ctx", StoreError::Unauthorized);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::bad_request("x").status(), StatusCode::BAD_REQUEST);
    }
}
