//! Blob storage configuration.

use serde::{Deserialize, Serialize};

/// Blob storage configuration for uploaded material files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root path for local blob storage.
    #[serde(default = "default_local_root")]
    pub local_root: String,
    /// Base URL prepended to blob keys to form the stored locator.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Maximum upload size in bytes (default 100 MB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            local_root: default_local_root(),
            public_base_url: default_public_base_url(),
            max_upload_size_bytes: default_max_upload(),
        }
    }
}

fn default_local_root() -> String {
    "./data/materials".to_string()
}

fn default_public_base_url() -> String {
    "/files".to_string()
}

fn default_max_upload() -> u64 {
    104_857_600 // 100 MB
}
