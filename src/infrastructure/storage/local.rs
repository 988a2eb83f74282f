//! Filesystem-backed blob store

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

use crate::domain::{DomainError, DomainResult};

use super::BlobStore;

/// Stores blobs under a root directory; paths handed out are relative
/// to that root so the root can move between deployments.
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn sanitized_name(filename: &str) -> String {
        let name = Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload");
        name.chars()
            .map(|c| if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
            .collect()
    }

    fn resolve(&self, relative: &str) -> DomainResult<PathBuf> {
        let rel = Path::new(relative);
        // Reject traversal; stored paths are always flat
        if rel.components().any(|c| matches!(c, Component::ParentDir | Component::RootDir)) {
            return Err(DomainError::Storage(format!("invalid blob path: {relative}")));
        }
        Ok(self.root.join(rel))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn save(&self, filename: &str, bytes: &[u8]) -> DomainResult<String> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;

        let relative = format!("{}-{}", Uuid::new_v4(), Self::sanitized_name(filename));
        let path = self.root.join(&relative);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        Ok(relative)
    }

    async fn delete(&self, relative_path: &str) -> DomainResult<()> {
        let path = self.resolve(relative_path)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::Storage(e.to_string())),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (LocalBlobStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!("unirides-blobs-{}", Uuid::new_v4()));
        (LocalBlobStore::new(dir.clone()), dir)
    }

    #[tokio::test]
    async fn save_then_delete_roundtrip() {
        let (store, dir) = store();
        let rel = store.save("soat.pdf", b"PDFDATA").await.unwrap();
        assert!(rel.ends_with("soat.pdf"));
        assert!(dir.join(&rel).exists());

        store.delete(&rel).await.unwrap();
        assert!(!dir.join(&rel).exists());
    }

    #[tokio::test]
    async fn delete_missing_is_ok() {
        let (store, _dir) = store();
        store.delete("does-not-exist.pdf").await.unwrap();
    }

    #[tokio::test]
    async fn traversal_rejected() {
        let (store, _dir) = store();
        assert!(store.delete("../../etc/passwd").await.is_err());
    }

    #[tokio::test]
    async fn weird_filenames_sanitized() {
        let (store, dir) = store();
        let rel = store.save("../..//sóat photo.pdf", b"x").await.unwrap();
        assert!(!rel.contains(".."));
        assert!(!rel.contains('/'));
        assert!(dir.join(&rel).exists());
    }
}
