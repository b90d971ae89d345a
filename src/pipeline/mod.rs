// file: src/pipeline/mod.rs
// description: pipeline module exports and public api
// reference: pipeline orchestration

pub mod orchestrator;
pub mod progress;

pub use orchestrator::{CheckReport, PipelineOrchestrator};
pub use progress::{CheckStats, ProgressTracker};
