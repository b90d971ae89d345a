// file: src/storage/requests.rs
// description: persistence for the auditor's current document request
// reference: internal module structure

use crate::error::{PipelineError, Result};
use crate::models::AuditRequest;
use crate::storage::object_store::ObjectStore;
use crate::utils::validation::Validator;
use std::sync::Arc;
use tracing::info;

/// Stores one current request per audit. A new submission replaces the
/// previous one wholesale, so auditees always retrieve the latest
/// complete request.
#[derive(Clone)]
pub struct RequestStore {
    store: Arc<dyn ObjectStore>,
}

impl RequestStore {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    fn object_key(audit_id: &str) -> String {
        format!("{audit_id}/request.json")
    }

    pub async fn put(&self, request: &AuditRequest) -> Result<()> {
        Validator::validate_audit_id(&request.audit_id)?;

        let bytes = serde_json::to_vec_pretty(request)
            .map_err(|e| PipelineError::Serialization(e.to_string()))?;
        self.store
            .put(&Self::object_key(&request.audit_id), bytes)
            .await?;

        info!(
            "Stored request for audit {}: {}",
            request.audit_id, request.document_name
        );
        Ok(())
    }

    pub async fn get(&self, audit_id: &str) -> Result<AuditRequest> {
        Validator::validate_audit_id(audit_id)?;

        match self.store.get(&Self::object_key(audit_id)).await? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| PipelineError::Serialization(e.to_string())),
            None => Err(PipelineError::RequestNotFound(audit_id.to_string())),
        }
    }
}
