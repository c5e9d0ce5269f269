//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{Argon2Hasher, DbAdapter, FsBlobStore},
    config::Config,
    error::ApiError,
    web::{build_router, AppState},
};
use photo_sharing_core::memory::InMemoryStore;
use photo_sharing_core::ports::{BlobStore, Clock, PasswordHasher, SystemClock};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize Service Adapters ---
    let blobs: Arc<dyn BlobStore> =
        Arc::new(FsBlobStore::create(&config.images_dir, &config.images_url_prefix).await?);
    info!("Serving images from {}", config.images_dir.display());
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // --- 3. Connect to Database & Run Migrations, Build the Shared AppState ---
    let app_state = match &config.database_url {
        Some(database_url) => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            let db_adapter = Arc::new(DbAdapter::new(db_pool));
            info!("Running database migrations...");
            db_adapter.run_migrations().await?;
            info!("Database migrations complete.");
            AppState::assemble(config.clone(), db_adapter, blobs, hasher, clock)
        }
        None => {
            warn!("DATABASE_URL is not set; all data is kept in memory and lost on exit.");
            let store = Arc::new(InMemoryStore::new());
            AppState::assemble(config.clone(), store, blobs, hasher, clock)
        }
    };

    // --- 4. Create the Web Router ---
    let app = build_router(Arc::new(app_state));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
