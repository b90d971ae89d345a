// file: src/generation/bedrock.rs
// description: Bedrock-backed text generation with tolerant body parsing
// reference: https://docs.rs/aws-sdk-bedrockruntime

use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::generation::generator::TextGenerator;
use async_trait::async_trait;
use aws_sdk_bedrockruntime::Client;
use aws_sdk_bedrockruntime::primitives::Blob;
use serde::Serialize;
use tracing::debug;

#[derive(Serialize)]
struct TitanRequest<'a> {
    #[serde(rename = "inputText")]
    input_text: &'a str,
}

pub struct BedrockGenerator {
    client: Client,
    model_id: String,
}

impl BedrockGenerator {
    pub async fn from_config(config: &Config) -> Self {
        let sdk_config = crate::aws::sdk_config(&config.aws).await;
        Self::with_client(Client::new(&sdk_config), config.generation.model_id.clone())
    }

    pub fn with_client(client: Client, model_id: String) -> Self {
        Self { client, model_id }
    }
}

#[async_trait]
impl TextGenerator for BedrockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = serde_json::to_vec(&TitanRequest { input_text: prompt })
            .map_err(|e| PipelineError::Serialization(e.to_string()))?;

        let output = self
            .client
            .invoke_model()
            .model_id(&self.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(body))
            .send()
            .await
            .map_err(|e| PipelineError::GenerationService(format!("InvokeModel: {e}")))?;

        let raw = String::from_utf8_lossy(output.body().as_ref()).into_owned();
        debug!("Model {} returned {} bytes", self.model_id, raw.len());

        Ok(parse_generation_body(&raw))
    }
}

/// Pulls the generated text out of a model response. Response shapes
/// vary by model family, so several known field layouts are tried and
/// the raw body is returned as a last resort.
pub fn parse_generation_body(raw: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(raw) else {
        return raw.to_string();
    };

    if let Some(text) = value.get("outputText").and_then(|v| v.as_str()) {
        return text.to_string();
    }

    if let Some(result) = value
        .get("results")
        .and_then(|v| v.as_array())
        .and_then(|results| results.first())
    {
        for field in ["outputText", "output", "generatedText"] {
            if let Some(text) = result.get(field).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }

    raw.to_string()
}
