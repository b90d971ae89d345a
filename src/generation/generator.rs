// file: src/generation/generator.rs
// description: text generation seam over the language model service
// reference: internal module structure

use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Sends one prompt and returns the generated text.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
