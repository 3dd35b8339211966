//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use tutorhub_core::config::AppConfig;
use tutorhub_core::traits::BlobStore;
use tutorhub_service::access::AccessPropagationEngine;
use tutorhub_service::material::{MaterialListingService, MaterialService, TreeNavigator};

use crate::app::Backend;

/// Shared application state passed to all handlers via Axum's `State`.
///
/// All fields are `Arc`-wrapped for cheap cloning across handler tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Material CRUD.
    pub material_service: Arc<MaterialService>,
    /// Listings and the access report.
    pub listing_service: Arc<MaterialListingService>,
    /// Grant and revoke cascades.
    pub access_engine: Arc<AccessPropagationEngine>,
    /// Tree reads.
    pub tree_navigator: Arc<TreeNavigator>,
    /// Blob storage, kept for health checks.
    pub blobs: Arc<dyn BlobStore>,
}

impl AppState {
    /// Wires the services over a storage backend.
    pub fn new(config: AppConfig, backend: Backend) -> Self {
        let Backend {
            materials,
            visibility,
            directory,
            blobs,
        } = backend;

        Self {
            config: Arc::new(config),
            material_service: Arc::new(MaterialService::new(
                Arc::clone(&materials),
                Arc::clone(&directory),
                Arc::clone(&blobs),
            )),
            listing_service: Arc::new(MaterialListingService::new(
                Arc::clone(&materials),
                Arc::clone(&visibility),
                directory,
            )),
            access_engine: Arc::new(AccessPropagationEngine::new(visibility)),
            tree_navigator: Arc::new(TreeNavigator::new(materials)),
            blobs,
        }
    }
}
