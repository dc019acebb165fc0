//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps domain outcomes to HTTP status codes and the service's flat JSON
//! error body `{"error": "<message>"}`. Authentication failures and
//! internal errors are collapsed to fixed messages so no diagnostic detail
//! reaches the caller; the detail is logged server-side instead.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use catalog_core::TokenError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Flat JSON error response body.
///
/// Every error response uses this shape, matching the service's wire
/// contract (`{"error": "Unauthorized"}`, `{"error": "Item not found"}`).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Referenced item does not exist (404). The message is returned to
    /// the client verbatim.
    #[error("not found: {0}")]
    NotFound(String),

    /// Request body could not be parsed or contains invalid values (422).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Authentication failure (401). The message carries the server-side
    /// reason; the client always sees the fixed body `"Unauthorized"`.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Internal server error (500). Message is logged but not returned to
    /// the client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code for this error.
    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Return the client-facing message for this error.
    ///
    /// Authentication failures collapse every cause (missing header, bad
    /// signature, expired token) into the same message, and internal
    /// errors never expose their detail.
    fn client_message(&self) -> String {
        match self {
            Self::Unauthorized(_) => "Unauthorized".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
            Self::NotFound(msg) | Self::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server-side errors for operator visibility.
        if let Self::Internal(_) = &self {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: self.client_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Token issuance failures are infrastructure errors: login cannot mint a
/// credential, which is unrelated to the caller's input.
impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        Self::Internal(format!("token issuance failed: {err}"))
    }
}
