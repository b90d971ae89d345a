// file: src/pipeline/orchestrator.rs
// description: coordinates request intake, upload, extraction, and judgment
// reference: orchestrates the asynchronous compliance workflow

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::generation::LanguageModel;
use crate::models::{AuditRequest, ComplianceVerdict, DocumentKind, ExtractionResult, UploadedDocument};
use crate::ocr::ExtractionCoordinator;
use crate::pipeline::progress::{CheckStats, ProgressTracker};
use crate::storage::{RequestStore, UploadStore};
use crate::utils::validation::Validator;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Everything produced by one completed check: the request it was
/// judged against, the stored upload, the extracted text, the verdict,
/// and a plain-language summary of the request.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub request: AuditRequest,
    pub document: UploadedDocument,
    pub extraction: ExtractionResult,
    pub verdict: ComplianceVerdict,
    pub summary: String,
}

#[derive(Clone)]
pub struct PipelineOrchestrator {
    requests: RequestStore,
    uploads: UploadStore,
    coordinator: ExtractionCoordinator,
    model: LanguageModel,
    max_upload_mb: usize,
    parallel_checks: usize,
}

impl PipelineOrchestrator {
    pub fn new(
        requests: RequestStore,
        uploads: UploadStore,
        coordinator: ExtractionCoordinator,
        model: LanguageModel,
        pipeline: &PipelineConfig,
    ) -> Self {
        Self {
            requests,
            uploads,
            coordinator,
            model,
            max_upload_mb: pipeline.max_upload_mb,
            parallel_checks: pipeline.parallel_checks.max(1),
        }
    }

    /// Stores a new request for the audit, replacing the current one.
    pub async fn submit_request(
        &self,
        audit_id: &str,
        document_name: &str,
        description: &str,
        with_summary: bool,
    ) -> Result<(AuditRequest, Option<String>)> {
        Validator::validate_not_blank(document_name, "document name")?;
        Validator::validate_not_blank(description, "description")?;

        let request = AuditRequest::new(
            audit_id.to_string(),
            document_name.trim().to_string(),
            description.trim().to_string(),
        );
        self.requests.put(&request).await?;

        let summary = if with_summary {
            Some(self.model.summarize(&request).await)
        } else {
            None
        };

        Ok((request, summary))
    }

    /// Retrieves the current request, optionally with a plain-language
    /// summary for the auditee.
    pub async fn review_request(
        &self,
        audit_id: &str,
        with_summary: bool,
    ) -> Result<(AuditRequest, Option<String>)> {
        let request = self.requests.get(audit_id).await?;

        let summary = if with_summary {
            Some(self.model.summarize_for_review(&request).await)
        } else {
            None
        };

        Ok((request, summary))
    }

    pub async fn check_file(&self, audit_id: &str, path: &Path) -> Result<CheckReport> {
        Validator::validate_file_path(path)?;

        let file_name = file_name_of(path)?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| PipelineError::FileOperation {
                path: path.to_path_buf(),
                source: e,
            })?;

        self.check_bytes(audit_id, &file_name, bytes).await
    }

    /// Runs the full check for one upload: fetch the current request,
    /// store the blob, extract text, and judge compliance. Failures in
    /// any stage are reported as typed errors; nothing is retried at
    /// this level.
    pub async fn check_bytes(
        &self,
        audit_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<CheckReport> {
        let request = self.requests.get(audit_id).await?;

        let mut document =
            UploadedDocument::new(audit_id.to_string(), file_name.to_string(), &bytes)?;
        Validator::validate_content_not_empty(&bytes)?;
        Validator::validate_upload_size(document.file_size, self.max_upload_mb)?;

        info!(
            "Checking {} ({}, {} bytes) against request '{}'",
            document.file_name, document.kind, document.file_size, request.document_name
        );

        if let Some(stored) = self.uploads.put(&document, bytes.clone()).await? {
            document.mark_stored(stored);
        }

        let extraction = self.coordinator.extract(&document, &bytes).await?;
        let verdict = self.model.judge_compliance(&request, &extraction).await?;
        let summary = self.model.summarize_for_review(&request).await;

        info!("Verdict for {}: {}", document.file_name, verdict.label());
        Ok(CheckReport {
            request,
            document,
            extraction,
            verdict,
            summary,
        })
    }

    /// Checks several files concurrently, bounded by the configured
    /// worker count. Per-file failures are collected, not short-circuited.
    pub async fn check_many(
        &self,
        audit_id: &str,
        files: Vec<PathBuf>,
        colored: bool,
    ) -> Result<(Vec<(PathBuf, Result<CheckReport>)>, CheckStats)> {
        // fail fast when no request exists rather than once per file
        self.requests.get(audit_id).await?;

        info!(
            "Checking {} files with {} concurrent tasks...",
            files.len(),
            self.parallel_checks
        );
        let progress = Arc::new(ProgressTracker::with_color(files.len(), colored));

        let tasks = files.into_iter().map(|path| {
            let orchestrator = self.clone();
            let audit_id = audit_id.to_string();
            let progress = progress.clone();

            async move {
                progress.set_message(format!(
                    "Checking {}",
                    Validator::truncate_text(&path.display().to_string(), 60)
                ));

                let outcome = orchestrator.check_file(&audit_id, &path).await;
                match &outcome {
                    Ok(report) => {
                        progress.add_bytes_processed(report.document.file_size);
                        progress.inc_check_completed(report.verdict.compliant);
                    }
                    Err(e) => {
                        progress.inc_check_failed();
                        warn!("Check failed for {}: {}", path.display(), e);
                    }
                }

                (path, outcome)
            }
        });

        let results: Vec<(PathBuf, Result<CheckReport>)> = stream::iter(tasks)
            .buffer_unordered(self.parallel_checks)
            .collect()
            .await;

        let stats = progress.get_stats();
        progress.finish();
        self.log_final_stats(&stats);

        Ok((results, stats))
    }

    /// Extracts text from a file without judging it. Multi-page
    /// documents are uploaded first so the extraction service can read
    /// them.
    pub async fn extract_file(&self, audit_id: &str, path: &Path) -> Result<ExtractionResult> {
        Validator::validate_file_path(path)?;

        let file_name = file_name_of(path)?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| PipelineError::FileOperation {
                path: path.to_path_buf(),
                source: e,
            })?;

        let mut document = UploadedDocument::new(audit_id.to_string(), file_name, &bytes)?;
        Validator::validate_content_not_empty(&bytes)?;
        Validator::validate_upload_size(document.file_size, self.max_upload_mb)?;

        if document.kind == DocumentKind::MultiPage
            && let Some(stored) = self.uploads.put(&document, bytes.clone()).await?
        {
            document.mark_stored(stored);
        }

        self.coordinator.extract(&document, &bytes).await
    }

    fn log_final_stats(&self, stats: &CheckStats) {
        info!("=== Compliance Check Summary ===");
        info!("Duration: {} seconds", stats.duration_secs);
        info!("Checks completed: {}", stats.checks_completed);
        info!("Checks failed: {}", stats.checks_failed);
        info!("Success rate: {:.2}%", stats.success_rate());
        info!("Compliant: {}", stats.compliant);
        info!("Non-compliant: {}", stats.non_compliant);
        info!("Compliance rate: {:.2}%", stats.compliance_rate());
        info!(
            "Throughput: {:.2} MB/sec",
            stats.bytes_per_second() / 1_048_576.0
        );
        info!("================================");
    }
}

fn file_name_of(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            PipelineError::Validation(format!("Invalid file name: {}", path.display()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::TextGenerator;
    use crate::models::ExtractionStatus;
    use crate::ocr::PollSchedule;
    use crate::ocr::detector::{DetectedText, JobPoll, TextDetector};
    use crate::storage::{MemoryObjectStore, ObjectStore};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct FakeDetector {
        sync_calls: AtomicU32,
        sync_responses: Mutex<VecDeque<Result<DetectedText>>>,
    }

    impl FakeDetector {
        fn with_lines(lines: &[&str]) -> Arc<Self> {
            let fake = Self::default();
            fake.sync_responses
                .lock()
                .unwrap()
                .push_back(Ok(DetectedText {
                    lines: lines.iter().map(|l| l.to_string()).collect(),
                    pages: Some(1),
                }));
            Arc::new(fake)
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self::default())
        }
    }

    #[async_trait::async_trait]
    impl TextDetector for FakeDetector {
        async fn detect_text(&self, _bytes: &[u8]) -> Result<DetectedText> {
            self.sync_calls.fetch_add(1, Ordering::SeqCst);
            self.sync_responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| {
                    Err(PipelineError::ExtractionService("service down".to_string()))
                })
        }

        async fn start_job(&self, _document: &UploadedDocument) -> Result<String> {
            Ok("job-1".to_string())
        }

        async fn check_job(&self, _job_id: &str) -> Result<JobPoll> {
            Ok(JobPoll::InProgress)
        }
    }

    #[derive(Default)]
    struct FakeGenerator {
        calls: AtomicU32,
        responses: Mutex<VecDeque<Result<String>>>,
    }

    impl FakeGenerator {
        fn scripted(responses: Vec<Result<String>>) -> Arc<Self> {
            let fake = Self::default();
            *fake.responses.lock().unwrap() = responses.into();
            Arc::new(fake)
        }
    }

    #[async_trait::async_trait]
    impl TextGenerator for FakeGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok("generated text".to_string()))
        }
    }

    struct Harness {
        orchestrator: PipelineOrchestrator,
        memory: Arc<MemoryObjectStore>,
        detector: Arc<FakeDetector>,
        generator: Arc<FakeGenerator>,
    }

    fn harness(detector: Arc<FakeDetector>, generator: Arc<FakeGenerator>) -> Harness {
        let memory = Arc::new(MemoryObjectStore::new());
        let store: Arc<dyn ObjectStore> = memory.clone();

        let schedule = PollSchedule {
            initial: Duration::from_millis(5),
            multiplier: 2.0,
            max_interval: Duration::from_millis(10),
            max_wait: Duration::from_millis(100),
        };
        let pipeline = PipelineConfig {
            parallel_checks: 2,
            max_upload_mb: 10,
        };

        let orchestrator = PipelineOrchestrator::new(
            RequestStore::new(store.clone()),
            UploadStore::new(store),
            ExtractionCoordinator::new(detector.clone(), schedule),
            LanguageModel::new(generator.clone(), 1),
            &pipeline,
        );

        Harness {
            orchestrator,
            memory,
            detector,
            generator,
        }
    }

    async fn submit_w2_request(harness: &Harness) {
        harness
            .orchestrator
            .submit_request(
                "audit-12",
                "W-2 form",
                "Most recent W-2 wage statement",
                false,
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_check_compliant_w2_image() {
        let harness = harness(
            FakeDetector::with_lines(&[
                "W-2 Wage and Tax Statement",
                "Employer: Example Corp",
                "Wages: 52,000",
            ]),
            FakeGenerator::scripted(vec![
                Ok("The W-2 wage fields match the request.".to_string()),
                Ok("You must provide your W-2.".to_string()),
            ]),
        );
        submit_w2_request(&harness).await;

        let report = harness
            .orchestrator
            .check_bytes("audit-12", "w2.png", b"fake image bytes".to_vec())
            .await
            .unwrap();

        assert!(report.verdict.compliant);
        assert_eq!(report.extraction.status, ExtractionStatus::Succeeded);
        assert_eq!(report.extraction.line_count(), 3);
        assert_eq!(report.summary, "You must provide your W-2.");
        // request record plus one upload blob
        assert_eq!(harness.memory.len().await, 2);
    }

    #[tokio::test]
    async fn test_check_wrong_document_is_non_compliant() {
        let harness = harness(
            FakeDetector::with_lines(&["Bank Statement", "Closing balance: 1,204.33"]),
            FakeGenerator::scripted(vec![
                Ok("This is a bank statement, not a W-2. A W-2 lists wages.".to_string()),
                Ok("You must provide your W-2.".to_string()),
            ]),
        );
        submit_w2_request(&harness).await;

        let report = harness
            .orchestrator
            .check_bytes("audit-12", "statement.png", b"fake image bytes".to_vec())
            .await
            .unwrap();

        assert!(!report.verdict.compliant);
        let corrective = report.verdict.corrective_example.as_deref().unwrap();
        assert!(!corrective.is_empty());
        assert!(report.verdict.missing_keywords.contains(&"w-2".to_string()));
    }

    #[tokio::test]
    async fn test_check_without_request_is_not_found() {
        let harness = harness(
            FakeDetector::with_lines(&["anything"]),
            FakeGenerator::scripted(vec![]),
        );

        let err = harness
            .orchestrator
            .check_bytes("audit-12", "w2.png", b"fake image bytes".to_vec())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::RequestNotFound(_)));
        assert_eq!(harness.detector.sync_calls.load(Ordering::SeqCst), 0);
        assert!(harness.memory.is_empty().await);
    }

    #[tokio::test]
    async fn test_unsupported_type_never_reaches_storage_or_ocr() {
        let harness = harness(
            FakeDetector::with_lines(&["anything"]),
            FakeGenerator::scripted(vec![]),
        );
        submit_w2_request(&harness).await;

        let err = harness
            .orchestrator
            .check_bytes("audit-12", "notes.docx", b"doc bytes".to_vec())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::UnsupportedFileType(_)));
        assert_eq!(harness.detector.sync_calls.load(Ordering::SeqCst), 0);
        // only the request record, no upload blob
        assert_eq!(harness.memory.len().await, 1);
    }

    #[tokio::test]
    async fn test_empty_upload_is_rejected() {
        let harness = harness(
            FakeDetector::with_lines(&["anything"]),
            FakeGenerator::scripted(vec![]),
        );
        submit_w2_request(&harness).await;

        let err = harness
            .orchestrator
            .check_bytes("audit-12", "w2.png", Vec::new())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Validation(_)));
        assert_eq!(harness.detector.sync_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_degraded_summary_does_not_fail_the_check() {
        let harness = harness(
            FakeDetector::with_lines(&["W-2 Wage and Tax Statement"]),
            FakeGenerator::scripted(vec![
                Ok("Evidence matches.".to_string()),
                Err(PipelineError::GenerationService("down".to_string())),
                Err(PipelineError::GenerationService("down".to_string())),
            ]),
        );
        submit_w2_request(&harness).await;

        let report = harness
            .orchestrator
            .check_bytes("audit-12", "w2.png", b"fake image bytes".to_vec())
            .await
            .unwrap();

        assert!(report.verdict.compliant);
        assert!(report.summary.starts_with("Summary unavailable"));
    }

    #[tokio::test]
    async fn test_generation_outage_fails_the_check() {
        let harness = harness(
            FakeDetector::with_lines(&["Bank Statement"]),
            FakeGenerator::scripted(vec![
                Err(PipelineError::GenerationService("down".to_string())),
                Err(PipelineError::GenerationService("down".to_string())),
            ]),
        );
        submit_w2_request(&harness).await;

        let err = harness
            .orchestrator
            .check_bytes("audit-12", "statement.png", b"fake image bytes".to_vec())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::GenerationService(_)));
    }

    #[tokio::test]
    async fn test_extraction_outage_skips_judgment() {
        let harness = harness(FakeDetector::failing(), FakeGenerator::scripted(vec![]));
        submit_w2_request(&harness).await;

        let err = harness
            .orchestrator
            .check_bytes("audit-12", "w2.png", b"fake image bytes".to_vec())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::ExtractionService(_)));
        // retried once, then gave up without calling the generator
        assert_eq!(harness.detector.sync_calls.load(Ordering::SeqCst), 2);
        assert_eq!(harness.generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_submit_request_validates_fields() {
        let harness = harness(
            FakeDetector::with_lines(&["anything"]),
            FakeGenerator::scripted(vec![]),
        );

        let err = harness
            .orchestrator
            .submit_request("audit-12", "  ", "description", false)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));

        let err = harness
            .orchestrator
            .submit_request("audit-12", "W-2 form", "", false)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
    }

    #[tokio::test]
    async fn test_submit_then_review_roundtrip() {
        let harness = harness(
            FakeDetector::with_lines(&["anything"]),
            FakeGenerator::scripted(vec![
                Ok("Submission summary.".to_string()),
                Ok("Review summary.".to_string()),
            ]),
        );

        let (submitted, summary) = harness
            .orchestrator
            .submit_request(
                "audit-12",
                "W-2 form",
                "Most recent W-2 wage statement",
                true,
            )
            .await
            .unwrap();
        assert_eq!(summary.as_deref(), Some("Submission summary."));

        let (reviewed, summary) = harness
            .orchestrator
            .review_request("audit-12", true)
            .await
            .unwrap();
        assert_eq!(reviewed, submitted);
        assert_eq!(summary.as_deref(), Some("Review summary."));
    }

    #[tokio::test]
    async fn test_check_many_collects_mixed_outcomes() {
        let harness = harness(
            FakeDetector::with_lines(&["W-2 Wage and Tax Statement"]),
            FakeGenerator::scripted(vec![]),
        );
        submit_w2_request(&harness).await;

        let dir = tempfile::TempDir::new().unwrap();
        let good = dir.path().join("w2.png");
        let bad = dir.path().join("notes.docx");
        std::fs::write(&good, b"fake image bytes").unwrap();
        std::fs::write(&bad, b"doc bytes").unwrap();

        let (results, stats) = harness
            .orchestrator
            .check_many("audit-12", vec![good, bad], false)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(stats.checks_completed, 1);
        assert_eq!(stats.checks_failed, 1);
        assert_eq!(stats.compliant, 1);
    }

    #[tokio::test]
    async fn test_check_many_without_request_fails_fast() {
        let harness = harness(
            FakeDetector::with_lines(&["anything"]),
            FakeGenerator::scripted(vec![]),
        );

        let err = harness
            .orchestrator
            .check_many("audit-12", vec![PathBuf::from("w2.png")], false)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::RequestNotFound(_)));
    }
}
