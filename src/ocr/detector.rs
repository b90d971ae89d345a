// file: src/ocr/detector.rs
// description: text detection seam over the extraction service
// reference: internal module structure

use crate::error::Result;
use crate::models::UploadedDocument;
use async_trait::async_trait;

/// Ordered text lines reported by the extraction service, top to
/// bottom in reading order.
#[derive(Debug, Clone)]
pub struct DetectedText {
    pub lines: Vec<String>,
    pub pages: Option<u32>,
}

/// One observation of an asynchronous extraction job.
#[derive(Debug, Clone)]
pub enum JobPoll {
    InProgress,
    Succeeded(DetectedText),
    Failed { reason: String },
}

#[async_trait]
pub trait TextDetector: Send + Sync {
    /// Synchronous single-image detection on raw bytes.
    async fn detect_text(&self, bytes: &[u8]) -> Result<DetectedText>;

    /// Starts an asynchronous job for a stored multi-page document and
    /// returns its job id.
    async fn start_job(&self, document: &UploadedDocument) -> Result<String>;

    /// Checks an asynchronous job once.
    async fn check_job(&self, job_id: &str) -> Result<JobPoll>;
}
