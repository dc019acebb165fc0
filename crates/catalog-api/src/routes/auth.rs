//! # Registration & Login
//!
//! Placeholder account flow carried over from the service contract:
//! registration accepts credentials and reports success without persisting
//! anything, and login issues a bearer token for a fixed identity without
//! checking the credentials. Neither endpoint requires authentication.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::extract_json;
use crate::routes::MessageBody;
use crate::state::AppState;

/// The identity every login currently resolves to.
// TODO: replace with the account looked up during credential verification
// once a user store exists.
const PLACEHOLDER_USER_ID: i64 = 1;

/// Credentials supplied to `/register` and `/login`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// POST /register — Register a new account.
#[utoipa::path(
    post,
    path = "/register",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Registration accepted", body = MessageBody),
    ),
    tag = "auth"
)]
pub async fn register(
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<MessageBody>, AppError> {
    let _credentials = extract_json(body)?;
    // TODO: persist the account and hash the password once a user store
    // exists. Until then registration accepts any credentials.
    Ok(Json(MessageBody::new("User registered successfully")))
}

/// POST /login — Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let _credentials = extract_json(body)?;
    // TODO: verify the credentials against stored accounts once
    // registration persists them.
    let token = state.tokens.issue(PLACEHOLDER_USER_ID, Utc::now())?;
    Ok(Json(TokenResponse { token }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_deserialize_from_expected_shape() {
        let creds: CredentialsRequest = serde_json::from_value(serde_json::json!({
            "username": "alice",
            "password": "hunter2"
        }))
        .unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, "hunter2");
    }

    #[test]
    fn credentials_reject_missing_password() {
        let result: Result<CredentialsRequest, _> =
            serde_json::from_value(serde_json::json!({"username": "alice"}));
        assert!(result.is_err());
    }

    #[test]
    fn token_response_serializes_to_token_field() {
        let json = serde_json::to_value(TokenResponse {
            token: "abc".to_string(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"token": "abc"}));
    }
}
