//! # catalog-api — Axum HTTP Service for the Catalog
//!
//! Token-authenticated CRUD over the item resource, backed by an
//! in-memory store with optional Postgres write-through, plus a
//! placeholder register/login flow issuing bearer tokens.
//!
//! ## API Surface
//!
//! | Route                  | Auth | Module            |
//! |------------------------|------|-------------------|
//! | `POST /register`       | no   | [`routes::auth`]  |
//! | `POST /login`          | no   | [`routes::auth`]  |
//! | `POST /items`          | yes  | [`routes::items`] |
//! | `GET /items`           | yes  | [`routes::items`] |
//! | `GET /items/:id`       | yes  | [`routes::items`] |
//! | `PUT /items/:id`       | yes  | [`routes::items`] |
//! | `DELETE /items/:id`    | yes  | [`routes::items`] |
//! | `GET /health/*`        | no   | this module       |
//! | `GET /openapi.json`    | no   | [`openapi`]       |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → AuthMiddleware → Handler        (items routes only)
//! ```

pub mod auth;
pub mod db;
pub mod error;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// `/register`, `/login`, health probes, and the OpenAPI spec are mounted
/// outside the auth middleware so they remain accessible without
/// credentials. The item routes run behind it.
pub fn app(state: AppState) -> Router {
    // Authenticated item routes.
    //
    // Body size limit: 1 MiB. Item payloads are small; this prevents OOM
    // from oversized request bodies.
    //
    // Middleware execution order (outermost → innermost):
    //   TraceLayer → AuthMiddleware → Handler
    //
    // The token service rides in as an extension so the auth middleware
    // can verify without touching router state.
    let api = Router::new()
        .merge(routes::items::router())
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(from_fn(auth::auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(state.tokens.clone()))
        .with_state(state.clone());

    // Unauthenticated routes: account flow, health probes, OpenAPI spec.
    let unauthenticated = Router::new()
        .merge(routes::auth::router())
        .merge(openapi::router())
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness))
        .with_state(state);

    Router::new().merge(unauthenticated).merge(api)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — verifies the application is ready to serve traffic.
///
/// Checks the in-memory store is accessible and, when configured, that
/// the database connection is healthy. Returns 200 "ready" or 503 with a
/// diagnostic message.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    // Verify the store is accessible (read lock acquirable).
    let _ = state.items.len();

    // Verify database connection (when configured).
    if let Some(pool) = &state.db_pool {
        if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
            tracing::warn!("Database health check failed: {e}");
            return (StatusCode::SERVICE_UNAVAILABLE, "database unreachable").into_response();
        }
    }

    (StatusCode::OK, "ready").into_response()
}
