// file: src/generation/mod.rs
// description: text generation module exports
// reference: internal module structure

pub mod adapter;
pub mod bedrock;
pub mod generator;
pub mod prompts;

pub use adapter::{LanguageModel, SUMMARY_UNAVAILABLE_NOTE, degraded_summary};
pub use bedrock::BedrockGenerator;
pub use generator::TextGenerator;
pub use prompts::PromptTemplate;
