// file: src/models/request.rs
// description: audit request record submitted by the auditor
// reference: internal data structures

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRequest {
    pub audit_id: String,
    pub document_name: String,
    pub description: String,
    pub created_at: u64,
}

impl AuditRequest {
    pub fn new(audit_id: String, document_name: String, description: String) -> Self {
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();

        Self {
            audit_id,
            document_name,
            description,
            created_at,
        }
    }

    /// Single-line rendering used in operator output and generation prompts.
    pub fn display_line(&self) -> String {
        format!("{}: {}", self.document_name, self.description)
    }
}
