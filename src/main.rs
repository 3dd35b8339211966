//! TutorHub server: materials library HTTP API.
//!
//! Main entry point that wires configuration, logging, the database, and
//! blob storage together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use tutorhub_api::{Backend, run_server};
use tutorhub_core::config::AppConfig;
use tutorhub_core::error::AppError;
use tutorhub_database::DatabasePool;
use tutorhub_storage::LocalBlobStore;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load `config/default.toml`, the `TUTORHUB_ENV` overlay, and environment overrides
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("TUTORHUB_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting TutorHub v{}", env!("CARGO_PKG_VERSION"));

    let db = DatabasePool::connect(&config.database).await?;
    if config.database.run_migrations {
        tutorhub_database::migration::run_migrations(db.pool()).await?;
    }

    let blobs = LocalBlobStore::from_config(&config.storage).await?;
    tracing::info!(root = %config.storage.local_root, "Local blob storage ready");

    let backend = Backend::postgres(db.pool().clone(), Arc::new(blobs));
    let result = run_server(config, backend).await;

    db.close().await;
    result
}
