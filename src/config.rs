// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{PipelineError, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub aws: AwsConfig,
    pub storage: StorageConfig,
    pub extraction: ExtractionConfig,
    pub generation: GenerationConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AwsConfig {
    pub region: String,
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub bucket: String,
    pub local_path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Local,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::S3 => "s3",
            StorageBackend::Local => "local",
        }
    }
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractionConfig {
    pub poll_initial_ms: u64,
    pub poll_multiplier: f64,
    pub poll_max_ms: u64,
    pub max_wait_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    pub model_id: String,
    pub retries: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    pub parallel_checks: usize,
    pub max_upload_mb: usize,
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(config::File::from(Path::new("config/default.toml")));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("AUDIT_PIPELINE")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let mut config: Config = settings
            .try_deserialize()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        // BUCKET_NAME and AWS_DEFAULT_REGION override file settings when set
        if let Ok(bucket) = std::env::var("BUCKET_NAME") {
            config.storage.bucket = bucket;
        }
        if let Ok(region) = std::env::var("AWS_DEFAULT_REGION") {
            config.aws.region = region;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            aws: AwsConfig {
                region: "us-west-2".to_string(),
                endpoint_url: None,
            },
            storage: StorageConfig {
                backend: StorageBackend::S3,
                bucket: "audit-12-test".to_string(),
                local_path: PathBuf::from("./data/audit_store"),
            },
            extraction: ExtractionConfig {
                poll_initial_ms: 1000,
                poll_multiplier: 2.0,
                poll_max_ms: 8000,
                max_wait_secs: 120,
            },
            generation: GenerationConfig {
                model_id: "amazon.titan-text-lite-v1".to_string(),
                retries: 1,
            },
            pipeline: PipelineConfig {
                parallel_checks: 4,
                max_upload_mb: 10,
            },
        }
    }

    fn validate(&self) -> Result<()> {
        if self.pipeline.parallel_checks == 0 {
            return Err(PipelineError::Config(
                "parallel_checks must be greater than 0".to_string(),
            ));
        }

        if self.pipeline.max_upload_mb == 0 {
            return Err(PipelineError::Config(
                "max_upload_mb must be greater than 0".to_string(),
            ));
        }

        if self.extraction.poll_initial_ms == 0 {
            return Err(PipelineError::Config(
                "poll_initial_ms must be greater than 0".to_string(),
            ));
        }

        if self.extraction.poll_multiplier < 1.0 {
            return Err(PipelineError::Config(
                "poll_multiplier must be at least 1.0".to_string(),
            ));
        }

        if self.extraction.max_wait_secs == 0 {
            return Err(PipelineError::Config(
                "max_wait_secs must be greater than 0".to_string(),
            ));
        }

        if self.generation.model_id.is_empty() {
            return Err(PipelineError::Config(
                "model_id must not be empty".to_string(),
            ));
        }

        if self.storage.backend == StorageBackend::S3 && self.storage.bucket.is_empty() {
            return Err(PipelineError::Config(
                "bucket must not be empty for the s3 backend".to_string(),
            ));
        }

        Ok(())
    }
}
