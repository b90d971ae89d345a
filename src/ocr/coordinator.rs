// file: src/ocr/coordinator.rs
// description: extraction routing and asynchronous job polling
// reference: internal module structure

use crate::config::ExtractionConfig;
use crate::error::{PipelineError, Result};
use crate::models::{DocumentKind, ExtractionResult, ExtractionStatus, UploadedDocument};
use crate::ocr::detector::{JobPoll, TextDetector};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Poll timing for asynchronous jobs. Intervals start at `initial` and
/// grow by `multiplier` per check up to `max_interval`; `max_wait`
/// bounds the whole job from extraction start.
#[derive(Debug, Clone, Copy)]
pub struct PollSchedule {
    pub initial: Duration,
    pub multiplier: f64,
    pub max_interval: Duration,
    pub max_wait: Duration,
}

impl PollSchedule {
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            initial: Duration::from_millis(config.poll_initial_ms),
            multiplier: config.poll_multiplier,
            max_interval: Duration::from_millis(config.poll_max_ms),
            max_wait: Duration::from_secs(config.max_wait_secs),
        }
    }

    pub fn interval_after(&self, checks: u32) -> Duration {
        let scaled = self.initial.as_millis() as f64 * self.multiplier.powi(checks as i32);
        let capped = scaled.min(self.max_interval.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }
}

/// Routes a document to synchronous detection or an asynchronous job
/// based on its kind, and drives the job to a terminal state.
#[derive(Clone)]
pub struct ExtractionCoordinator {
    detector: Arc<dyn TextDetector>,
    schedule: PollSchedule,
}

impl ExtractionCoordinator {
    pub fn new(detector: Arc<dyn TextDetector>, schedule: PollSchedule) -> Self {
        Self { detector, schedule }
    }

    /// Extracts text from an uploaded document. A returned result is
    /// always a succeeded terminal state; failed and timed-out jobs
    /// surface as typed errors and any partial text is discarded.
    pub async fn extract(
        &self,
        document: &UploadedDocument,
        bytes: &[u8],
    ) -> Result<ExtractionResult> {
        let started = Instant::now();

        let result = match document.kind {
            DocumentKind::Image => self.extract_image(document, bytes, started).await,
            DocumentKind::MultiPage => self.extract_multi_page(document, started).await,
        };

        match &result {
            Ok(extraction) => info!(
                "Extraction succeeded for {} ({} lines in {} ms)",
                document.file_name,
                extraction.line_count(),
                extraction.elapsed_ms
            ),
            Err(e) => warn!("Extraction failed for {}: {}", document.file_name, e),
        }

        result
    }

    async fn extract_image(
        &self,
        document: &UploadedDocument,
        bytes: &[u8],
        started: Instant,
    ) -> Result<ExtractionResult> {
        debug!("Running synchronous detection for {}", document.file_name);

        let detected = match self.detector.detect_text(bytes).await {
            Ok(detected) => detected,
            Err(first) => {
                warn!("Synchronous detection failed, retrying once: {}", first);
                self.detector.detect_text(bytes).await?
            }
        };

        Ok(ExtractionResult::succeeded(
            document.id.clone(),
            detected.lines,
            detected.pages,
            started.elapsed().as_millis() as u64,
        ))
    }

    async fn extract_multi_page(
        &self,
        document: &UploadedDocument,
        started: Instant,
    ) -> Result<ExtractionResult> {
        debug!(
            "Extraction job for {} is {}",
            document.file_name,
            ExtractionStatus::Pending
        );

        let job_id = match self.detector.start_job(document).await {
            Ok(job_id) => job_id,
            Err(first) => {
                warn!("Failed to start extraction job, retrying once: {}", first);
                self.detector.start_job(document).await?
            }
        };
        info!("Started extraction job {} for {}", job_id, document.file_name);

        let mut checks: u32 = 0;
        let mut failed_checks: u32 = 0;
        loop {
            if started.elapsed() >= self.schedule.max_wait {
                warn!(
                    "Extraction job {} reached status {} after {} checks",
                    job_id,
                    ExtractionStatus::TimedOut,
                    checks
                );
                return Err(PipelineError::ExtractionTimeout {
                    job_id,
                    waited_secs: started.elapsed().as_secs(),
                });
            }

            match self.detector.check_job(&job_id).await {
                Ok(JobPoll::Succeeded(detected)) => {
                    return Ok(ExtractionResult::succeeded(
                        document.id.clone(),
                        detected.lines,
                        detected.pages,
                        started.elapsed().as_millis() as u64,
                    ));
                }
                Ok(JobPoll::Failed { reason }) => {
                    warn!(
                        "Extraction job {} reached status {}: {}",
                        job_id,
                        ExtractionStatus::Failed,
                        reason
                    );
                    return Err(PipelineError::ExtractionService(reason));
                }
                Ok(JobPoll::InProgress) => {
                    debug!(
                        "Extraction job {} status: {}",
                        job_id,
                        ExtractionStatus::Running
                    );
                }
                Err(e) if failed_checks == 0 => {
                    failed_checks += 1;
                    warn!("Job check failed, retrying once: {}", e);
                }
                Err(e) => return Err(e),
            }

            let interval = self.schedule.interval_after(checks);
            checks += 1;
            let remaining = self.schedule.max_wait.saturating_sub(started.elapsed());
            tokio::time::sleep(interval.min(remaining)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::detector::DetectedText;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Default)]
    struct FakeDetector {
        sync_calls: AtomicU32,
        start_calls: AtomicU32,
        check_calls: AtomicU32,
        sync_responses: Mutex<VecDeque<Result<DetectedText>>>,
        start_responses: Mutex<VecDeque<Result<String>>>,
        check_responses: Mutex<VecDeque<Result<JobPoll>>>,
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
                    Err(PipelineError::ExtractionService(
                        "unexpected detect_text call".to_string(),
                    ))
                })
        }

        async fn start_job(&self, _document: &UploadedDocument) -> Result<String> {
            self.start_calls.fetch_add(1, Ordering::SeqCst);
            self.start_responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok("job-1".to_string()))
        }

        async fn check_job(&self, _job_id: &str) -> Result<JobPoll> {
            self.check_calls.fetch_add(1, Ordering::SeqCst);
            self.check_responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(JobPoll::InProgress))
        }
    }

    fn fast_schedule() -> PollSchedule {
        PollSchedule {
            initial: Duration::from_millis(5),
            multiplier: 2.0,
            max_interval: Duration::from_millis(10),
            max_wait: Duration::from_millis(500),
        }
    }

    fn image_doc() -> UploadedDocument {
        UploadedDocument::new(
            "audit-12".to_string(),
            "w2.png".to_string(),
            b"fake image bytes",
        )
        .unwrap()
    }

    fn pdf_doc() -> UploadedDocument {
        UploadedDocument::new(
            "audit-12".to_string(),
            "statement.pdf".to_string(),
            b"%PDF-1.4",
        )
        .unwrap()
    }

    fn detected(lines: &[&str]) -> DetectedText {
        DetectedText {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            pages: Some(1),
        }
    }

    #[test]
    fn test_interval_growth_and_cap() {
        let schedule = PollSchedule {
            initial: Duration::from_millis(1000),
            multiplier: 2.0,
            max_interval: Duration::from_millis(8000),
            max_wait: Duration::from_secs(120),
        };

        assert_eq!(schedule.interval_after(0), Duration::from_millis(1000));
        assert_eq!(schedule.interval_after(1), Duration::from_millis(2000));
        assert_eq!(schedule.interval_after(2), Duration::from_millis(4000));
        assert_eq!(schedule.interval_after(3), Duration::from_millis(8000));
        assert_eq!(schedule.interval_after(4), Duration::from_millis(8000));
    }

    #[tokio::test]
    async fn test_image_uses_sync_detection_only() {
        let detector = Arc::new(FakeDetector::default());
        detector
            .sync_responses
            .lock()
            .unwrap()
            .push_back(Ok(detected(&["W-2 Wage and Tax Statement"])));
        let coordinator = ExtractionCoordinator::new(detector.clone(), fast_schedule());

        let result = coordinator
            .extract(&image_doc(), b"fake image bytes")
            .await
            .unwrap();

        assert_eq!(result.status, ExtractionStatus::Succeeded);
        assert_eq!(result.lines, vec!["W-2 Wage and Tax Statement"]);
        assert_eq!(detector.sync_calls.load(Ordering::SeqCst), 1);
        assert_eq!(detector.start_calls.load(Ordering::SeqCst), 0);
        assert_eq!(detector.check_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_sync_detection_retries_once() {
        let detector = Arc::new(FakeDetector::default());
        {
            let mut responses = detector.sync_responses.lock().unwrap();
            responses.push_back(Err(PipelineError::ExtractionService(
                "throttled".to_string(),
            )));
            responses.push_back(Ok(detected(&["Employer: Example Corp"])));
        }
        let coordinator = ExtractionCoordinator::new(detector.clone(), fast_schedule());

        let result = coordinator
            .extract(&image_doc(), b"fake image bytes")
            .await
            .unwrap();

        assert_eq!(result.lines, vec!["Employer: Example Corp"]);
        assert_eq!(detector.sync_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_sync_detection_gives_up_after_retry() {
        let detector = Arc::new(FakeDetector::default());
        {
            let mut responses = detector.sync_responses.lock().unwrap();
            responses.push_back(Err(PipelineError::ExtractionService("down".to_string())));
            responses.push_back(Err(PipelineError::ExtractionService("down".to_string())));
        }
        let coordinator = ExtractionCoordinator::new(detector.clone(), fast_schedule());

        let err = coordinator
            .extract(&image_doc(), b"fake image bytes")
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::ExtractionService(_)));
        assert_eq!(detector.sync_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_multi_page_polls_until_success() {
        let detector = Arc::new(FakeDetector::default());
        {
            let mut responses = detector.check_responses.lock().unwrap();
            responses.push_back(Ok(JobPoll::InProgress));
            responses.push_back(Ok(JobPoll::InProgress));
            responses.push_back(Ok(JobPoll::Succeeded(detected(&[
                "Bank Statement",
                "Closing balance: 1,204.33",
            ]))));
        }
        let coordinator = ExtractionCoordinator::new(detector.clone(), fast_schedule());

        let result = coordinator.extract(&pdf_doc(), b"%PDF-1.4").await.unwrap();

        assert_eq!(result.status, ExtractionStatus::Succeeded);
        assert_eq!(result.line_count(), 2);
        assert_eq!(detector.check_calls.load(Ordering::SeqCst), 3);
        assert_eq!(detector.sync_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_multi_page_job_failure_is_typed() {
        let detector = Arc::new(FakeDetector::default());
        detector
            .check_responses
            .lock()
            .unwrap()
            .push_back(Ok(JobPoll::Failed {
                reason: "document is encrypted".to_string(),
            }));
        let coordinator = ExtractionCoordinator::new(detector.clone(), fast_schedule());

        let err = coordinator.extract(&pdf_doc(), b"%PDF-1.4").await.unwrap_err();

        assert!(
            matches!(err, PipelineError::ExtractionService(reason) if reason.contains("encrypted"))
        );
    }

    #[tokio::test]
    async fn test_stalled_job_times_out() {
        let detector = Arc::new(FakeDetector::default());
        let schedule = PollSchedule {
            initial: Duration::from_millis(5),
            multiplier: 2.0,
            max_interval: Duration::from_millis(10),
            max_wait: Duration::from_millis(30),
        };
        let coordinator = ExtractionCoordinator::new(detector.clone(), schedule);

        let err = coordinator.extract(&pdf_doc(), b"%PDF-1.4").await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::ExtractionTimeout { job_id, .. } if job_id == "job-1"
        ));
        assert!(detector.check_calls.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_check_failure_retries_once_then_propagates() {
        let detector = Arc::new(FakeDetector::default());
        {
            let mut responses = detector.check_responses.lock().unwrap();
            responses.push_back(Err(PipelineError::ExtractionService(
                "transient".to_string(),
            )));
            responses.push_back(Err(PipelineError::ExtractionService(
                "still down".to_string(),
            )));
        }
        let coordinator = ExtractionCoordinator::new(detector.clone(), fast_schedule());

        let err = coordinator.extract(&pdf_doc(), b"%PDF-1.4").await.unwrap_err();

        assert!(matches!(err, PipelineError::ExtractionService(reason) if reason == "still down"));
        assert_eq!(detector.check_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_start_failure_retries_once() {
        let detector = Arc::new(FakeDetector::default());
        detector
            .start_responses
            .lock()
            .unwrap()
            .push_back(Err(PipelineError::ExtractionService(
                "throttled".to_string(),
            )));
        detector
            .check_responses
            .lock()
            .unwrap()
            .push_back(Ok(JobPoll::Succeeded(detected(&["Bank Statement"]))));
        let coordinator = ExtractionCoordinator::new(detector.clone(), fast_schedule());

        let result = coordinator.extract(&pdf_doc(), b"%PDF-1.4").await.unwrap();

        assert_eq!(result.line_count(), 1);
        assert_eq!(detector.start_calls.load(Ordering::SeqCst), 2);
    }
}
