//! services/api/src/adapters/blob.rs
//!
//! Filesystem implementation of the `BlobStore` port. Files live flat in one
//! directory under generated names, which the router also serves statically.

use async_trait::async_trait;
use photo_sharing_core::input::extension_for;
use photo_sharing_core::ports::{BlobStore, PortError, PortResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct FsBlobStore {
    root: PathBuf,
    url_prefix: String,
}

impl FsBlobStore {
    /// Creates the store, making `root` if it does not exist yet.
    pub async fn create(root: impl Into<PathBuf>, url_prefix: &str) -> std::io::Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Generated names never contain separators, so anything else is refused.
    fn path_of(&self, file_ref: &str) -> PortResult<PathBuf> {
        let plain = !file_ref.is_empty()
            && !file_ref.starts_with('.')
            && !file_ref.contains(['/', '\\']);
        if !plain {
            return Err(PortError::Unexpected(format!("Invalid file reference {:?}", file_ref)));
        }
        Ok(self.root.join(file_ref))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn store(&self, bytes: &[u8], mime_type: &str) -> PortResult<String> {
        let extension = extension_for(mime_type)
            .ok_or_else(|| PortError::Unexpected(format!("Unsupported MIME type {}", mime_type)))?;
        let file_ref = format!("{}.{}", Uuid::new_v4(), extension);
        tokio::fs::write(self.path_of(&file_ref)?, bytes)
            .await
            .map_err(|e| PortError::Unexpected(format!("Failed to write {}: {}", file_ref, e)))?;
        Ok(file_ref)
    }

    async fn delete(&self, file_ref: &str) -> PortResult<()> {
        match tokio::fs::remove_file(self.path_of(file_ref)?).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(PortError::NotFound(format!("File {} not found", file_ref)))
            }
            Err(e) => Err(PortError::Unexpected(format!("Failed to delete {}: {}", file_ref, e))),
        }
    }

    fn url_for(&self, file_ref: &str) -> String {
        format!("{}/{}", self.url_prefix, file_ref)
    }
}
