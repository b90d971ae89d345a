// file: src/models/verdict.rs
// description: compliance verdict produced for a checked document
// reference: internal data structures

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceVerdict {
    pub document_id: String,
    pub compliant: bool,
    pub rationale: String,
    /// Generated description of what a correct submission would look
    /// like. Only present on non-compliant verdicts.
    pub corrective_example: Option<String>,
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
}

impl ComplianceVerdict {
    pub fn compliant(
        document_id: String,
        rationale: String,
        matched_keywords: Vec<String>,
        missing_keywords: Vec<String>,
    ) -> Self {
        Self {
            document_id,
            compliant: true,
            rationale,
            corrective_example: None,
            matched_keywords,
            missing_keywords,
        }
    }

    pub fn non_compliant(
        document_id: String,
        rationale: String,
        corrective_example: String,
        matched_keywords: Vec<String>,
        missing_keywords: Vec<String>,
    ) -> Self {
        Self {
            document_id,
            compliant: false,
            rationale,
            corrective_example: Some(corrective_example),
            matched_keywords,
            missing_keywords,
        }
    }

    pub fn label(&self) -> &'static str {
        if self.compliant { "compliant" } else { "non-compliant" }
    }
}
