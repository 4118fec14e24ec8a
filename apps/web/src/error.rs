//! Central error type for the API: every failure a handler can produce,
//! with its HTTP status and a stable machine-readable code.
//!
//! Internal errors never leak details to the client; the full error goes to
//! the log instead.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use openlot_checkout::CheckoutError;
use openlot_core::{CoreError, ValidationError};
use openlot_db::DbError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Payment declined: {0}")]
    PaymentDeclined(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// The answer for a surface that is switched off: it does not exist.
    pub fn surface_disabled() -> Self {
        ApiError::NotFound("Not found".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, code) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, "UNAUTHORIZED"),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, "BAD_REQUEST"),
            ApiError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string(), "VALIDATION"),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "NOT_FOUND"),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg, "CONFLICT"),
            ApiError::PaymentDeclined(msg) => {
                (StatusCode::PAYMENT_REQUIRED, msg, "PAYMENT_DECLINED")
            }
            ApiError::Unavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, msg, "SERVICE_UNAVAILABLE")
            }
            ApiError::Internal(err) => {
                error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    "INTERNAL_ERROR",
                )
            }
        };

        let body = Json(json!({
            "error": code,
            "message": message
        }));

        (status, body).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DbError::UniqueViolation { .. }
            | DbError::ForeignKeyViolation { .. }
            | DbError::CheckViolation { .. } => ApiError::Conflict(err.to_string()),
            DbError::LockTimeout | DbError::PoolExhausted => ApiError::Unavailable(err.to_string()),
            other => ApiError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::CartEmpty => ApiError::BadRequest("cart is empty".to_string()),
            CheckoutError::ItemUnavailable => {
                ApiError::Conflict("one or more listings are no longer available".to_string())
            }
            CheckoutError::PaymentDeclined(reason) => ApiError::PaymentDeclined(reason.to_string()),
            CheckoutError::Infrastructure(inner) => ApiError::Unavailable(inner.to_string()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ListingNotFound(_) => ApiError::NotFound(err.to_string()),
            CoreError::ListingNotActive(_) => ApiError::Conflict(err.to_string()),
            CoreError::CartTooLarge { .. } | CoreError::InvalidAmount { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            CoreError::Validation(inner) => ApiError::Validation(inner),
        }
    }
}
