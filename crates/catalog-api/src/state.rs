//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! Items are served from an in-memory [`Store`] and written through to
//! PostgreSQL when a pool is configured. On startup the store is hydrated
//! from the database and the id counter is seeded past the highest
//! persisted id, so allocation stays monotonic across restarts.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use catalog_core::{Item, TokenError, TokenSecret, TokenService, TOKEN_TTL};
use parking_lot::RwLock;
use sqlx::PgPool;

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable in-memory store keyed by item id.
///
/// All operations are synchronous (the RwLock is `parking_lot`, not
/// `tokio::sync`) because the lock is never held across `.await` points.
/// `parking_lot::RwLock` is non-poisonable — a panicking writer does not
/// permanently corrupt the store.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    data: Arc<RwLock<HashMap<i64, T>>>,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: i64, value: T) -> Option<T> {
        self.data.write().insert(id, value)
    }

    /// Retrieve a record by id.
    pub fn get(&self, id: &i64) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    /// List all records, in no particular order.
    pub fn list(&self) -> Vec<T> {
        self.data.read().values().cloned().collect()
    }

    /// Update a record in place under a single write lock.
    ///
    /// Returns the updated record, or `None` if not found. The lock closes
    /// the read-then-act window, so concurrent updates of the same id
    /// serialize to last-write-wins rather than interleaving.
    pub fn update(&self, id: &i64, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut guard = self.data.write();
        if let Some(entry) = guard.get_mut(id) {
            f(entry);
            Some(entry.clone())
        } else {
            None
        }
    }

    /// Remove a record by id, returning it if it existed.
    pub fn remove(&self, id: &i64) -> Option<T> {
        self.data.write().remove(id)
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Configuration ------------------------------------------------------------

/// Application configuration, built once in `main` and threaded into
/// [`AppState`] — never ambient global state.
///
/// The token secret already redacts itself in `Debug` output.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Symmetric secret used to sign and verify bearer tokens.
    pub token_secret: TokenSecret,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            token_secret: TokenSecret::generate(),
        }
    }
}

/// Load the token secret from the environment, or generate one for development.
///
/// In production, `CATALOG_TOKEN_SECRET` provides the secret (at least 32
/// bytes). In development (when the variable is absent), a fresh secret is
/// generated and a warning is logged.
pub fn load_or_generate_token_secret() -> TokenSecret {
    match std::env::var("CATALOG_TOKEN_SECRET") {
        Ok(secret) => TokenSecret::new(secret.into_bytes()),
        Err(_) => {
            tracing::warn!(
                "CATALOG_TOKEN_SECRET not set — generating ephemeral secret. \
                 Tokens issued with it will not be verifiable after restart."
            );
            TokenSecret::generate()
        }
    }
}

// -- Application State --------------------------------------------------------

/// Shared application state accessible to all route handlers.
///
/// Clone-friendly via `Arc` internals in the store, the id counter, and
/// the token service.
#[derive(Clone)]
pub struct AppState {
    /// In-memory item store, hydrated from the database at startup.
    pub items: Store<Item>,

    /// Next item id. Ids are assigned by the application, not a database
    /// sequence, so that items created in in-memory-only mode behave
    /// identically to persisted ones.
    next_item_id: Arc<AtomicI64>,

    /// PostgreSQL connection pool for durable persistence.
    /// When `None`, the API operates in in-memory-only mode.
    pub db_pool: Option<PgPool>,

    /// Issues and verifies bearer tokens.
    pub tokens: TokenService,

    /// Application configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Create a new application state with default configuration and no
    /// database pool. Intended for tests and development.
    ///
    /// # Panics
    ///
    /// Panics if the generated secret is rejected, which cannot happen for
    /// secrets produced by [`TokenSecret::generate`].
    pub fn new() -> Self {
        Self::try_with_config(AppConfig::default(), None)
            .expect("generated token secret meets the minimum length")
    }

    /// Create a new application state with the given configuration and
    /// optional database pool.
    ///
    /// Returns `Err` if the configured token secret is too short.
    pub fn try_with_config(
        config: AppConfig,
        db_pool: Option<PgPool>,
    ) -> Result<Self, TokenError> {
        let tokens = TokenService::new(config.token_secret.clone(), TOKEN_TTL)?;
        Ok(Self {
            items: Store::new(),
            next_item_id: Arc::new(AtomicI64::new(1)),
            db_pool,
            tokens,
            config,
        })
    }

    /// Allocate the next item id.
    pub fn allocate_item_id(&self) -> i64 {
        self.next_item_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Load persisted items into the in-memory store and seed the id
    /// counter past the highest persisted id.
    ///
    /// No-op when no database pool is configured.
    pub async fn hydrate_from_db(&self) -> Result<(), sqlx::Error> {
        let Some(pool) = &self.db_pool else {
            return Ok(());
        };

        let items = crate::db::items::load_all(pool).await?;
        let count = items.len();
        let mut max_id = 0;
        for item in items {
            max_id = max_id.max(item.id);
            self.items.insert(item.id, item);
        }
        self.next_item_id.store(max_id + 1, Ordering::Relaxed);

        tracing::info!(items = count, "hydrated item store from database");
        Ok(())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::ItemDraft;

    fn item(id: i64, name: &str) -> Item {
        Item::from_draft(
            id,
            ItemDraft {
                name: name.to_string(),
                description: format!("{name} description"),
                price: 1.0,
            },
        )
    }

    // ── Store ────────────────────────────────────────────────────

    #[test]
    fn insert_and_get_roundtrip() {
        let store = Store::new();
        store.insert(1, item(1, "Widget"));
        let fetched = store.get(&1).expect("item present");
        assert_eq!(fetched.name, "Widget");
    }

    #[test]
    fn get_missing_returns_none() {
        let store: Store<Item> = Store::new();
        assert!(store.get(&999).is_none());
    }

    #[test]
    fn update_mutates_existing_record() {
        let store = Store::new();
        store.insert(1, item(1, "Widget"));
        let updated = store
            .update(&1, |i| i.name = "Gadget".to_string())
            .expect("item present");
        assert_eq!(updated.name, "Gadget");
        assert_eq!(store.get(&1).unwrap().name, "Gadget");
    }

    #[test]
    fn update_missing_returns_none_without_side_effects() {
        let store: Store<Item> = Store::new();
        assert!(store.update(&1, |i| i.name = "Gadget".to_string()).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn remove_deletes_record() {
        let store = Store::new();
        store.insert(1, item(1, "Widget"));
        assert!(store.remove(&1).is_some());
        assert!(store.get(&1).is_none());
        assert!(store.remove(&1).is_none());
    }

    #[test]
    fn list_returns_all_records() {
        let store = Store::new();
        store.insert(1, item(1, "A"));
        store.insert(2, item(2, "B"));
        assert_eq!(store.list().len(), 2);
        assert_eq!(store.len(), 2);
    }

    // ── AppState ─────────────────────────────────────────────────

    #[test]
    fn allocated_ids_are_monotonic_from_one() {
        let state = AppState::new();
        assert_eq!(state.allocate_item_id(), 1);
        assert_eq!(state.allocate_item_id(), 2);
        assert_eq!(state.allocate_item_id(), 3);
    }

    #[test]
    fn short_configured_secret_is_rejected() {
        let config = AppConfig {
            port: 3000,
            token_secret: TokenSecret::new(b"short".to_vec()),
        };
        assert!(AppState::try_with_config(config, None).is_err());
    }

    #[test]
    fn config_debug_redacts_secret() {
        let config = AppConfig {
            port: 3000,
            token_secret: TokenSecret::new(b"0123456789abcdef0123456789abcdef".to_vec()),
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("0123456789abcdef"));
    }
}
