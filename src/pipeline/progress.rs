// file: src/pipeline/progress.rs
// description: progress tracking and statistics reporting for compliance checks
// reference: uses indicatif for progress bars and tracks check metrics

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct CheckStats {
    pub checks_completed: usize,
    pub checks_failed: usize,
    pub compliant: usize,
    pub non_compliant: usize,
    pub total_bytes_processed: u64,
    pub duration_secs: u64,
}

impl CheckStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn checks_per_second(&self) -> f64 {
        if self.duration_secs == 0 {
            return 0.0;
        }
        self.checks_completed as f64 / self.duration_secs as f64
    }

    pub fn bytes_per_second(&self) -> f64 {
        if self.duration_secs == 0 {
            return 0.0;
        }
        self.total_bytes_processed as f64 / self.duration_secs as f64
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.checks_completed + self.checks_failed;
        if total == 0 {
            return 0.0;
        }
        (self.checks_completed as f64 / total as f64) * 100.0
    }

    pub fn compliance_rate(&self) -> f64 {
        if self.checks_completed == 0 {
            return 0.0;
        }
        (self.compliant as f64 / self.checks_completed as f64) * 100.0
    }
}

pub struct ProgressTracker {
    main_bar: ProgressBar,
    detail_bar: ProgressBar,
    checks_completed: Arc<AtomicUsize>,
    checks_failed: Arc<AtomicUsize>,
    compliant: Arc<AtomicUsize>,
    non_compliant: Arc<AtomicUsize>,
    bytes_processed: Arc<AtomicU64>,
    start_time: Instant,
}

impl ProgressTracker {
    pub fn new(total_checks: usize) -> Self {
        Self::with_color(total_checks, true)
    }

    pub fn with_color(total_checks: usize, colored: bool) -> Self {
        let multi_progress = MultiProgress::new();

        let main_bar = create_progress_bar(&multi_progress, total_checks as u64, colored);
        let detail_bar = create_detail_bar(&multi_progress);

        Self {
            main_bar,
            detail_bar,
            checks_completed: Arc::new(AtomicUsize::new(0)),
            checks_failed: Arc::new(AtomicUsize::new(0)),
            compliant: Arc::new(AtomicUsize::new(0)),
            non_compliant: Arc::new(AtomicUsize::new(0)),
            bytes_processed: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn inc_check_completed(&self, compliant: bool) {
        self.checks_completed.fetch_add(1, Ordering::SeqCst);
        if compliant {
            self.compliant.fetch_add(1, Ordering::SeqCst);
        } else {
            self.non_compliant.fetch_add(1, Ordering::SeqCst);
        }
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn inc_check_failed(&self) {
        self.checks_failed.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn add_bytes_processed(&self, bytes: u64) {
        self.bytes_processed.fetch_add(bytes, Ordering::SeqCst);
    }

    pub fn set_message(&self, message: String) {
        self.detail_bar.set_message(message);
    }

    pub fn finish(&self) {
        self.main_bar.finish_with_message("Checks complete");
        self.detail_bar.finish_and_clear();
    }

    pub fn get_stats(&self) -> CheckStats {
        let duration = self.start_time.elapsed().as_secs();

        CheckStats {
            checks_completed: self.checks_completed.load(Ordering::SeqCst),
            checks_failed: self.checks_failed.load(Ordering::SeqCst),
            compliant: self.compliant.load(Ordering::SeqCst),
            non_compliant: self.non_compliant.load(Ordering::SeqCst),
            total_bytes_processed: self.bytes_processed.load(Ordering::SeqCst),
            duration_secs: duration,
        }
    }

    fn update_detail_bar(&self) {
        let compliant = self.compliant.load(Ordering::SeqCst);
        let non_compliant = self.non_compliant.load(Ordering::SeqCst);
        let failed = self.checks_failed.load(Ordering::SeqCst);

        let message = format!(
            "Compliant: {} | Non-compliant: {} | Failed: {}",
            compliant, non_compliant, failed
        );

        self.detail_bar.set_message(message);
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.finish();
    }
}

fn create_progress_bar(multi_progress: &MultiProgress, total: u64, colored: bool) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(total));
    if colored {
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
                )
                .expect("Failed to create progress bar template")
                .progress_chars("█▓▒░"),
        );
    } else {
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({eta}) {msg}")
                .expect("Failed to create progress bar template")
                .progress_chars("=>-"),
        );
    }
    bar
}

fn create_detail_bar(multi_progress: &MultiProgress) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(0));
    let style = ProgressStyle::default_bar()
        .template("{msg}")
        .expect("Failed to create detail bar template");
    bar.set_style(style);
    bar
}
