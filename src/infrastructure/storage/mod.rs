//! Blob storage facade for vehicle document uploads
//!
//! The database keeps only the relative paths this store hands back.

mod local;

pub use local::LocalBlobStore;

use async_trait::async_trait;

use crate::domain::DomainResult;

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist one blob; returns the opaque relative path to record
    async fn save(&self, filename: &str, bytes: &[u8]) -> DomainResult<String>;

    /// Remove a previously saved blob. Missing blobs are not an error.
    async fn delete(&self, relative_path: &str) -> DomainResult<()>;
}
