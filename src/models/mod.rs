// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod document;
pub mod extraction;
pub mod request;
pub mod verdict;

pub use document::{DocumentKind, UploadedDocument};
pub use extraction::{ExtractionResult, ExtractionStatus};
pub use request::AuditRequest;
pub use verdict::ComplianceVerdict;
