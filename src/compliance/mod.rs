// file: src/compliance/mod.rs
// description: compliance rules module exports
// reference: internal module structure

pub mod rules;

pub use rules::KeywordEvidence;
