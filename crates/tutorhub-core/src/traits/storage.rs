//! Blob storage trait for uploaded material files.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Trait for opaque blob storage backends.
///
/// The materials core never reads file contents; it only needs to turn an
/// upload into a locator it can persist, and to drop the blob again when
/// the material is deleted.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Store bytes under `key` and return the locator to persist.
    async fn put(&self, key: &str, data: Bytes) -> AppResult<String>;

    /// Remove the blob a locator points at. Missing blobs are not an error.
    async fn delete(&self, locator: &str) -> AppResult<()>;
}
