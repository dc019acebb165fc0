//! # Authentication Middleware
//!
//! Bearer token middleware for the item endpoints.
//!
//! The token is whatever follows the first space in the `Authorization`
//! header value. There is no scheme pre-check: a non-Bearer scheme yields
//! a token that fails signature verification, and the response is the same
//! generic 401 either way. Every failure (missing header, malformed token,
//! bad signature, expired token) collapses into one fixed
//! `{"error": "Unauthorized"}` body; the reason is only logged server-side.
//!
//! On success the decoded user id is injected into request extensions as
//! [`Identity`], which handlers extract via `FromRequestParts`.

use axum::extract::Request;
use axum::http::request::Parts;
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use catalog_core::TokenService;
use chrono::Utc;

use crate::error::AppError;

/// Identity of the authenticated caller, decoded from a verified token.
///
/// Constructed per-request by the auth middleware and scoped to that
/// request; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
}

/// Axum `FromRequestParts` implementation for `Identity`.
///
/// Extracts the identity that the auth middleware injected into extensions.
/// Returns 401 if no identity is present (middleware didn't run or failed).
#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .copied()
            .ok_or_else(|| AppError::Unauthorized("no identity in request context".into()))
    }
}

/// Verify the bearer token on the request and inject the caller identity.
///
/// The [`TokenService`] arrives via request extensions, installed as a
/// layer outside this middleware.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let Some(tokens) = request.extensions().get::<TokenService>().cloned() else {
        tracing::error!("token service missing from request extensions");
        return AppError::Internal("token service not configured".into()).into_response();
    };

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match auth_header {
        Some(value) => {
            let token = value.split(' ').nth(1).unwrap_or("");
            match tokens.verify(token, Utc::now()) {
                Ok(claims) => {
                    request.extensions_mut().insert(Identity {
                        user_id: claims.user_id,
                    });
                    next.run(request).await
                }
                Err(reason) => {
                    tracing::warn!(%reason, "authentication failed: invalid bearer token");
                    unauthorized()
                }
            }
        }
        None => {
            tracing::warn!("authentication failed: missing authorization header");
            unauthorized()
        }
    }
}

fn unauthorized() -> Response {
    AppError::Unauthorized("bearer token rejected".into()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::middleware::from_fn;
    use axum::routing::get;
    use axum::{Extension, Router};
    use catalog_core::{TokenSecret, TOKEN_TTL};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_tokens() -> TokenService {
        TokenService::new(
            TokenSecret::new(b"0123456789abcdef0123456789abcdef".to_vec()),
            TOKEN_TTL,
        )
        .expect("valid service")
    }

    /// Build a minimal router with the auth middleware and a handler that
    /// echoes the extracted user id.
    fn test_app(tokens: TokenService) -> Router {
        Router::new()
            .route(
                "/test",
                get(|identity: Identity| async move { identity.user_id.to_string() }),
            )
            .layer(from_fn(auth_middleware))
            .layer(Extension(tokens))
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn valid_bearer_token_accepted_and_identity_injected() {
        let tokens = test_tokens();
        let token = tokens.issue(42, Utc::now()).unwrap();
        let app = test_app(tokens);

        let request = Request::builder()
            .uri("/test")
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "42");
    }

    #[tokio::test]
    async fn missing_authorization_header_rejected() {
        let app = test_app(test_tokens());

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let err: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(err["error"], "Unauthorized");
    }

    #[tokio::test]
    async fn garbage_token_rejected() {
        let app = test_app(test_tokens());

        let request = Request::builder()
            .uri("/test")
            .header("Authorization", "Bearer not-a-token")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn header_without_token_segment_rejected() {
        // "Bearer" with no second segment: the extracted token is empty and
        // fails verification rather than being rejected up front.
        let app = test_app(test_tokens());

        let request = Request::builder()
            .uri("/test")
            .header("Authorization", "Bearer")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn expired_token_rejected() {
        let tokens = test_tokens();
        let token = tokens
            .issue(1, Utc::now() - chrono::Duration::hours(2))
            .unwrap();
        let app = test_app(tokens);

        let request = Request::builder()
            .uri("/test")
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let err: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap();
        // Expiry must not be distinguishable from any other failure.
        assert_eq!(err["error"], "Unauthorized");
    }

    #[tokio::test]
    async fn token_from_foreign_secret_rejected() {
        let foreign = TokenService::new(
            TokenSecret::new(b"another-secret-another-secret-xx".to_vec()),
            TOKEN_TTL,
        )
        .expect("valid service");
        let token = foreign.issue(1, Utc::now()).unwrap();
        let app = test_app(test_tokens());

        let request = Request::builder()
            .uri("/test")
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
