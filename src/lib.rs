// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod aws;
pub mod compliance;
pub mod config;
pub mod error;
pub mod generation;
pub mod models;
pub mod ocr;
pub mod pipeline;
pub mod storage;
pub mod utils;

pub use compliance::KeywordEvidence;
pub use config::{
    AwsConfig, Config, ExtractionConfig, GenerationConfig, PipelineConfig, StorageBackend,
    StorageConfig,
};
pub use error::{PipelineError, Result};
pub use generation::{BedrockGenerator, LanguageModel, TextGenerator};
pub use models::{
    AuditRequest, ComplianceVerdict, DocumentKind, ExtractionResult, ExtractionStatus,
    UploadedDocument,
};
pub use ocr::{ExtractionCoordinator, PollSchedule, TextDetector, TextractDetector};
pub use pipeline::{CheckReport, CheckStats, PipelineOrchestrator, ProgressTracker};
pub use storage::{
    FsObjectStore, MemoryObjectStore, ObjectStore, RequestStore, S3ObjectStore, StoredObject,
    UploadStore,
};
pub use utils::{HealthCheck, HealthReport, HealthStatus, OperationTimer, Validator};
