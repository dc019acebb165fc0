//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Adds the bearer token security scheme to the OpenAPI spec.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some(
                            "Bearer token authentication. Obtain a token via POST /login.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog API",
        version = "0.1.0",
        description = "Token-authenticated CRUD over the catalog item resource, with a placeholder register/login flow issuing bearer tokens.\n\nAuthentication: `Authorization: Bearer <token>` on all `/items` endpoints. `/register`, `/login`, and health probes (`/health/*`) are unauthenticated.",
        license(name = "BUSL-1.1")
    ),
    modifiers(&SecurityAddon),
    paths(
        // Auth
        crate::routes::auth::register,
        crate::routes::auth::login,
        // Items
        crate::routes::items::create_item,
        crate::routes::items::list_items,
        crate::routes::items::get_item,
        crate::routes::items::update_item,
        crate::routes::items::delete_item,
    ),
    components(schemas(
        catalog_core::Item,
        catalog_core::ItemDraft,
        crate::error::ErrorBody,
        crate::routes::MessageBody,
        crate::routes::auth::CredentialsRequest,
        crate::routes::auth::TokenResponse,
    )),
    tags(
        (name = "auth", description = "Registration and token issuance"),
        (name = "items", description = "Item CRUD"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
///
/// Serves the OpenAPI JSON spec at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
