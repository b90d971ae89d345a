// file: src/models/document.rs
// description: uploaded document model with file type classification
// reference: internal data structures

use crate::error::{PipelineError, Result};
use crate::storage::StoredObject;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Single images are handled by synchronous text detection.
    Image,
    /// Multi-page documents require an asynchronous extraction job.
    MultiPage,
}

impl DocumentKind {
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("png") | Some("jpg") | Some("jpeg") => Ok(DocumentKind::Image),
            Some("pdf") => Ok(DocumentKind::MultiPage),
            _ => Err(PipelineError::UnsupportedFileType(file_name.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Image => "image",
            DocumentKind::MultiPage => "multi-page",
        }
    }

    pub fn is_sync(&self) -> bool {
        matches!(self, DocumentKind::Image)
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedDocument {
    pub id: String,
    pub audit_id: String,
    pub file_name: String,
    pub kind: DocumentKind,
    pub content_hash: String,
    pub file_size: u64,
    pub uploaded_at: u64,
    /// Object-storage coordinates once the blob is written. Stays `None`
    /// for backends without service-readable locations.
    pub stored: Option<StoredObject>,
}

impl UploadedDocument {
    pub fn new(audit_id: String, file_name: String, bytes: &[u8]) -> Result<Self> {
        let kind = DocumentKind::from_file_name(&file_name)?;
        let content_hash = Self::compute_hash(bytes);
        let file_size = bytes.len() as u64;
        let uploaded_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            audit_id,
            file_name,
            kind,
            content_hash,
            file_size,
            uploaded_at,
            stored: None,
        })
    }

    fn compute_hash(bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        format!("{:x}", hasher.finalize())
    }

    pub fn mark_stored(&mut self, stored: StoredObject) {
        self.stored = Some(stored);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            DocumentKind::from_file_name("w2.png").unwrap(),
            DocumentKind::Image
        );
        assert_eq!(
            DocumentKind::from_file_name("scan.JPG").unwrap(),
            DocumentKind::Image
        );
        assert_eq!(
            DocumentKind::from_file_name("photo.jpeg").unwrap(),
            DocumentKind::Image
        );
        assert_eq!(
            DocumentKind::from_file_name("statement.pdf").unwrap(),
            DocumentKind::MultiPage
        );
    }

    #[test]
    fn test_kind_rejects_unsupported() {
        assert!(matches!(
            DocumentKind::from_file_name("notes.docx"),
            Err(PipelineError::UnsupportedFileType(_))
        ));
        assert!(matches!(
            DocumentKind::from_file_name("no_extension"),
            Err(PipelineError::UnsupportedFileType(_))
        ));
        assert!(matches!(
            DocumentKind::from_file_name("trailing."),
            Err(PipelineError::UnsupportedFileType(_))
        ));
    }

    #[test]
    fn test_document_creation() {
        let doc = UploadedDocument::new(
            "audit-12".to_string(),
            "w2.png".to_string(),
            b"fake image bytes",
        )
        .unwrap();

        assert_eq!(doc.audit_id, "audit-12");
        assert_eq!(doc.kind, DocumentKind::Image);
        assert_eq!(doc.file_size, 16);
        assert!(!doc.content_hash.is_empty());
        assert!(doc.stored.is_none());
    }

    #[test]
    fn test_hash_consistency() {
        let bytes = b"same payload";
        let hash1 = UploadedDocument::compute_hash(bytes);
        let hash2 = UploadedDocument::compute_hash(bytes);
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_mark_stored() {
        let mut doc = UploadedDocument::new(
            "audit-12".to_string(),
            "statement.pdf".to_string(),
            b"%PDF-1.4",
        )
        .unwrap();

        doc.mark_stored(StoredObject {
            bucket: "audit-12-test".to_string(),
            key: "audit-12/uploads/abc-statement.pdf".to_string(),
        });
        assert!(doc.stored.is_some());
    }
}
