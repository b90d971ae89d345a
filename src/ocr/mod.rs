// file: src/ocr/mod.rs
// description: text extraction module exports
// reference: internal module structure

pub mod coordinator;
pub mod detector;
pub mod textract;

pub use coordinator::{ExtractionCoordinator, PollSchedule};
pub use detector::{DetectedText, JobPoll, TextDetector};
pub use textract::TextractDetector;
