// file: src/storage/uploads.rs
// description: write-once blob storage for uploaded documents
// reference: internal module structure

use crate::error::Result;
use crate::models::UploadedDocument;
use crate::storage::object_store::{ObjectStore, StoredObject};
use crate::utils::validation::Validator;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct UploadStore {
    store: Arc<dyn ObjectStore>,
}

impl UploadStore {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    fn object_key(document: &UploadedDocument) -> String {
        format!(
            "{}/uploads/{}-{}",
            document.audit_id,
            document.id,
            Validator::sanitize_file_name(&document.file_name)
        )
    }

    /// Writes the document blob. Keys embed the generated document id,
    /// so every upload lands at a fresh key and stored blobs are never
    /// rewritten.
    pub async fn put(
        &self,
        document: &UploadedDocument,
        bytes: Vec<u8>,
    ) -> Result<Option<StoredObject>> {
        Validator::validate_audit_id(&document.audit_id)?;

        let key = Self::object_key(document);
        self.store.put(&key, bytes).await?;
        debug!("Stored upload {} at {}", document.id, key);

        Ok(self.store.stored_object(&key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::object_store::MemoryObjectStore;

    #[test]
    fn test_object_key_shape() {
        let doc = UploadedDocument::new(
            "audit-12".to_string(),
            "my statement (final).pdf".to_string(),
            b"%PDF-1.4",
        )
        .unwrap();

        let key = UploadStore::object_key(&doc);
        assert!(key.starts_with("audit-12/uploads/"));
        assert!(key.ends_with("my_statement__final_.pdf"));
        assert!(key.contains(&doc.id));
    }

    #[tokio::test]
    async fn test_repeat_uploads_get_distinct_keys() {
        let memory = Arc::new(MemoryObjectStore::new());
        let uploads = UploadStore::new(memory.clone());

        for _ in 0..2 {
            let doc = UploadedDocument::new(
                "audit-12".to_string(),
                "w2.png".to_string(),
                b"fake image bytes",
            )
            .unwrap();
            uploads.put(&doc, b"fake image bytes".to_vec()).await.unwrap();
        }

        assert_eq!(memory.len().await, 2);
    }

    #[tokio::test]
    async fn test_memory_backend_has_no_service_location() {
        let uploads = UploadStore::new(Arc::new(MemoryObjectStore::new()));
        let doc = UploadedDocument::new(
            "audit-12".to_string(),
            "w2.png".to_string(),
            b"fake image bytes",
        )
        .unwrap();

        let stored = uploads.put(&doc, b"fake image bytes".to_vec()).await.unwrap();
        assert!(stored.is_none());
    }
}
