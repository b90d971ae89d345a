// file: src/models/extraction.rs
// description: extraction job state machine and extracted text record
// reference: internal data structures

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    TimedOut,
}

impl ExtractionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStatus::Pending => "pending",
            ExtractionStatus::Running => "running",
            ExtractionStatus::Succeeded => "succeeded",
            ExtractionStatus::Failed => "failed",
            ExtractionStatus::TimedOut => "timed_out",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExtractionStatus::Succeeded | ExtractionStatus::Failed | ExtractionStatus::TimedOut
        )
    }
}

impl std::fmt::Display for ExtractionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a successful extraction. Failed and timed-out jobs surface
/// as typed errors instead, so a held `ExtractionResult` always carries
/// the full ordered line set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub document_id: String,
    pub status: ExtractionStatus,
    pub lines: Vec<String>,
    pub pages: Option<u32>,
    pub elapsed_ms: u64,
}

impl ExtractionResult {
    pub fn succeeded(
        document_id: String,
        lines: Vec<String>,
        pages: Option<u32>,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            document_id,
            status: ExtractionStatus::Succeeded,
            lines,
            pages,
            elapsed_ms,
        }
    }

    pub fn full_text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}
