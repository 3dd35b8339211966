//! Response DTOs.

use serde::{Deserialize, Serialize};

use tutorhub_core::types::MaterialId;

/// Plain message body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable outcome.
    pub message: String,
}

impl MessageResponse {
    /// Wraps a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result of deleting a material subtree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteMaterialResponse {
    /// Human-readable outcome.
    pub message: String,
    /// Every material removed, root first.
    pub removed: Vec<MaterialId>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status string.
    pub status: String,
    /// Server version.
    pub version: String,
}

/// Detailed health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    /// Overall status.
    pub status: String,
    /// Blob storage provider name.
    pub storage_provider: String,
    /// Blob storage status.
    pub storage: String,
}
