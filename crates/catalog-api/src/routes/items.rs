//! # Item API
//!
//! Token-authenticated CRUD over the item resource. Every handler runs
//! behind the auth middleware; the extracted [`Identity`] proves the
//! request carried a valid token.
//!
//! Mutations apply to the in-memory store first and are then written
//! through to Postgres when a pool is configured. A persistence failure is
//! surfaced as a 500 because the in-memory record would be lost on
//! restart, causing silent data loss.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use catalog_core::{Item, ItemDraft};

use crate::auth::Identity;
use crate::error::AppError;
use crate::extractors::extract_json;
use crate::routes::MessageBody;
use crate::state::AppState;

const ITEM_NOT_FOUND: &str = "Item not found";

/// Build the items router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/items", post(create_item).get(list_items))
        .route(
            "/items/:id",
            get(get_item).put(update_item).delete(delete_item),
        )
}

/// POST /items — Create an item.
///
/// Assigns a fresh id and returns the stored record.
#[utoipa::path(
    post,
    path = "/items",
    request_body = ItemDraft,
    responses(
        (status = 200, description = "Item created", body = Item),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "items"
)]
pub async fn create_item(
    State(state): State<AppState>,
    _identity: Identity,
    body: Result<Json<ItemDraft>, JsonRejection>,
) -> Result<Json<Item>, AppError> {
    let draft = extract_json(body)?;
    let id = state.allocate_item_id();
    let item = Item::from_draft(id, draft);

    state.items.insert(id, item.clone());

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::items::insert(pool, &item).await {
            tracing::error!(item_id = id, error = %e, "failed to persist item to database");
            return Err(AppError::Internal(
                "item recorded in-memory but database persist failed".to_string(),
            ));
        }
    }

    Ok(Json(item))
}

/// GET /items — List all items.
///
/// Items are returned in ascending id order, which equals insertion order.
#[utoipa::path(
    get,
    path = "/items",
    responses(
        (status = 200, description = "All items", body = [Item]),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "items"
)]
pub async fn list_items(
    State(state): State<AppState>,
    _identity: Identity,
) -> Json<Vec<Item>> {
    let mut items = state.items.list();
    items.sort_by_key(|item| item.id);
    Json(items)
}

/// GET /items/:id — Get an item by id.
#[utoipa::path(
    get,
    path = "/items/{id}",
    params(("id" = i64, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item found", body = Item),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "items"
)]
pub async fn get_item(
    State(state): State<AppState>,
    _identity: Identity,
    Path(id): Path<i64>,
) -> Result<Json<Item>, AppError> {
    let item = state
        .items
        .get(&id)
        .ok_or_else(|| AppError::NotFound(ITEM_NOT_FOUND.to_string()))?;

    Ok(Json(item))
}

/// PUT /items/:id — Replace the mutable fields of an item.
///
/// Overwrites name, description, and price unconditionally with the
/// supplied values; there is no merge-patch. Idempotent.
#[utoipa::path(
    put,
    path = "/items/{id}",
    params(("id" = i64, Path, description = "Item id")),
    request_body = ItemDraft,
    responses(
        (status = 200, description = "Item updated", body = Item),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "items"
)]
pub async fn update_item(
    State(state): State<AppState>,
    _identity: Identity,
    Path(id): Path<i64>,
    body: Result<Json<ItemDraft>, JsonRejection>,
) -> Result<Json<Item>, AppError> {
    let draft = extract_json(body)?;

    let updated = state
        .items
        .update(&id, |item| item.apply(draft))
        .ok_or_else(|| AppError::NotFound(ITEM_NOT_FOUND.to_string()))?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::items::update(pool, &updated).await {
            tracing::error!(item_id = id, error = %e, "failed to persist item update to database");
            return Err(AppError::Internal(
                "item updated in-memory but database persist failed".to_string(),
            ));
        }
    }

    Ok(Json(updated))
}

/// DELETE /items/:id — Delete an item.
#[utoipa::path(
    delete,
    path = "/items/{id}",
    params(("id" = i64, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item deleted", body = MessageBody),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "items"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    _identity: Identity,
    Path(id): Path<i64>,
) -> Result<Json<MessageBody>, AppError> {
    state
        .items
        .remove(&id)
        .ok_or_else(|| AppError::NotFound(ITEM_NOT_FOUND.to_string()))?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::items::delete(pool, id).await {
            tracing::error!(item_id = id, error = %e, "failed to delete item from database");
            return Err(AppError::Internal(
                "item removed in-memory but database delete failed".to_string(),
            ));
        }
    }

    Ok(Json(MessageBody::new("Item deleted successfully")))
}
