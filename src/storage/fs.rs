// file: src/storage/fs.rs
// description: filesystem-backed object store with atomic writes
// reference: https://docs.rs/tokio/latest/tokio/fs/index.html

use crate::error::{PipelineError, Result};
use crate::storage::object_store::{ObjectStore, StoredObject};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;
use uuid::Uuid;

/// Object store rooted at a local directory. Keys map to relative
/// paths; writes go through a temp file and rename so a concurrent
/// reader never observes a half-written object.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, key: &str) -> Result<PathBuf> {
        let traversal = key
            .split('/')
            .any(|part| part.is_empty() || part == "." || part == "..");
        if key.is_empty() || key.starts_with('/') || traversal {
            return Err(PipelineError::Validation(format!(
                "invalid object key: '{key}'"
            )));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        let path = self.object_path(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PipelineError::FileOperation {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("object");
        let tmp = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| PipelineError::FileOperation {
                path: tmp.clone(),
                source: e,
            })?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| PipelineError::FileOperation {
                path: path.clone(),
                source: e,
            })?;

        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.object_path(key)?;

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PipelineError::FileOperation { path, source: e }),
        }
    }

    async fn ensure_ready(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| PipelineError::FileOperation {
                path: self.root.clone(),
                source: e,
            })
    }

    async fn probe(&self) -> Result<()> {
        tokio::fs::metadata(&self.root).await.map_err(|_| {
            PipelineError::Storage(format!("store root missing: {}", self.root.display()))
        })?;
        Ok(())
    }

    fn stored_object(&self, _key: &str) -> Option<StoredObject> {
        None
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }
}
