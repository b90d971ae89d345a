// file: src/storage/object_store.rs
// description: keyed object store seam with an in-memory implementation
// reference: internal module structure

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Service-readable coordinates of a stored blob. Extraction jobs hand
/// these to Textract, which reads the document on the service side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub bucket: String,
    pub key: String,
}

/// Keyed blob storage behind the request and upload stores. A `put` to
/// an existing key replaces the object as a whole, so readers observe
/// either the old or the new object, never a mix.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()>;

    /// Reads an object, or `None` when the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Creates the backing bucket or directory if missing.
    async fn ensure_ready(&self) -> Result<()>;

    /// Non-mutating reachability check for health reporting.
    async fn probe(&self) -> Result<()>;

    /// Coordinates Textract can read a key from, when the backend has them.
    fn stored_object(&self, key: &str) -> Option<StoredObject>;

    fn location(&self) -> String;
}

/// Map-backed store for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.objects.write().await.insert(key.to_string(), bytes);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.objects.read().await.get(key).cloned())
    }

    async fn ensure_ready(&self) -> Result<()> {
        Ok(())
    }

    async fn probe(&self) -> Result<()> {
        Ok(())
    }

    fn stored_object(&self, _key: &str) -> Option<StoredObject> {
        None
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
