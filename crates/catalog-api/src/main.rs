//! # catalog-api — Binary Entry Point
//!
//! Starts the Axum HTTP server for the catalog service.
//! Binds to configurable port (default 3000).

use catalog_api::state::{load_or_generate_token_secret, AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Build configuration from environment.
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    let config = AppConfig {
        port,
        token_secret: load_or_generate_token_secret(),
    };

    // Initialize database pool (optional — absent means in-memory only).
    // Migrations run here, before the listener binds.
    let db_pool = catalog_api::db::init_pool().await.map_err(|e| {
        tracing::error!("Database initialization failed: {e}");
        e
    })?;

    let state = AppState::try_with_config(config, db_pool).map_err(|e| {
        tracing::error!("Token service initialization failed: {e}");
        e
    })?;

    // Hydrate the in-memory store from the database (if connected).
    state.hydrate_from_db().await.map_err(|e| {
        tracing::error!("Database hydration failed: {e}");
        e
    })?;

    let app = catalog_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Catalog API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
