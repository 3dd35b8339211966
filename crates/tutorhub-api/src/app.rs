//! Application builder: wires stores, services, router, and middleware.

use std::sync::Arc;

use axum::Router;
use sqlx::PgPool;

use tutorhub_core::config::AppConfig;
use tutorhub_core::error::AppError;
use tutorhub_core::traits::BlobStore;
use tutorhub_database::repositories::{
    DirectoryRepository, MaterialRepository, VisibilityRepository,
};
use tutorhub_database::store::{Directory, MaterialStore, VisibilityStore};

use crate::router::build_router;
use crate::state::AppState;

/// The storage a running app is built over.
#[derive(Debug, Clone)]
pub struct Backend {
    /// Material tree storage.
    pub materials: Arc<dyn MaterialStore>,
    /// Visibility grants.
    pub visibility: Arc<dyn VisibilityStore>,
    /// Teacher, course, and student lookups.
    pub directory: Arc<dyn Directory>,
    /// Uploaded file contents.
    pub blobs: Arc<dyn BlobStore>,
}

impl Backend {
    /// PostgreSQL repositories over one pool.
    pub fn postgres(pool: PgPool, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            materials: Arc::new(MaterialRepository::new(pool.clone())),
            visibility: Arc::new(VisibilityRepository::new(pool.clone())),
            directory: Arc::new(DirectoryRepository::new(pool)),
            blobs,
        }
    }

    /// In-memory stores, for tests and local experiments.
    #[cfg(feature = "memory")]
    pub fn memory(
        store: tutorhub_database::memory::MemoryStore,
        directory: tutorhub_database::memory::MemoryDirectory,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            materials: Arc::new(store.clone()),
            visibility: Arc::new(store),
            directory: Arc::new(directory),
            blobs,
        }
    }
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(config: AppConfig, backend: Backend) -> Router {
    build_router(AppState::new(config, backend))
}

/// Runs the TutorHub server until Ctrl+C or SIGTERM.
pub async fn run_server(config: AppConfig, backend: Backend) -> Result<(), AppError> {
    tracing::info!("Starting TutorHub server...");

    match backend.blobs.health_check().await {
        Ok(true) => {}
        Ok(false) => tracing::warn!(
            provider = backend.blobs.provider_type(),
            "Blob storage reported unhealthy"
        ),
        Err(e) => return Err(e),
    }

    let addr = config.server.bind_address();
    let app = build_app(config, backend);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("TutorHub server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    tracing::info!("TutorHub server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
