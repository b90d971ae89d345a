// file: src/ocr/textract.rs
// description: Textract-backed text detection for images and PDFs
// reference: https://docs.rs/aws-sdk-textract

use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::models::UploadedDocument;
use crate::ocr::detector::{DetectedText, JobPoll, TextDetector};
use async_trait::async_trait;
use aws_sdk_textract::Client;
use aws_sdk_textract::primitives::Blob;
use aws_sdk_textract::types::{Block, BlockType, Document, DocumentLocation, JobStatus, S3Object};
use tracing::debug;

pub struct TextractDetector {
    client: Client,
}

impl TextractDetector {
    pub async fn from_config(config: &Config) -> Self {
        let sdk_config = crate::aws::sdk_config(&config.aws).await;
        Self::with_client(Client::new(&sdk_config))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

fn collect_lines(blocks: &[Block]) -> Vec<String> {
    blocks
        .iter()
        .filter(|block| block.block_type() == Some(&BlockType::Line))
        .filter_map(|block| block.text())
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl TextDetector for TextractDetector {
    async fn detect_text(&self, bytes: &[u8]) -> Result<DetectedText> {
        let document = Document::builder().bytes(Blob::new(bytes)).build();

        let output = self
            .client
            .detect_document_text()
            .document(document)
            .send()
            .await
            .map_err(|e| PipelineError::ExtractionService(format!("DetectDocumentText: {e}")))?;

        let lines = collect_lines(output.blocks());
        let pages = output
            .document_metadata()
            .and_then(|metadata| metadata.pages())
            .map(|pages| pages as u32);

        debug!("Detected {} lines synchronously", lines.len());
        Ok(DetectedText { lines, pages })
    }

    async fn start_job(&self, document: &UploadedDocument) -> Result<String> {
        let stored = document.stored.as_ref().ok_or_else(|| {
            PipelineError::ExtractionService(
                "multi-page extraction needs a service-readable location; use the s3 backend"
                    .to_string(),
            )
        })?;

        let location = DocumentLocation::builder()
            .s3_object(
                S3Object::builder()
                    .bucket(&stored.bucket)
                    .name(&stored.key)
                    .build(),
            )
            .build();

        let output = self
            .client
            .start_document_text_detection()
            .document_location(location)
            .send()
            .await
            .map_err(|e| {
                PipelineError::ExtractionService(format!("StartDocumentTextDetection: {e}"))
            })?;

        output
            .job_id()
            .map(str::to_string)
            .ok_or_else(|| {
                PipelineError::ExtractionService(
                    "StartDocumentTextDetection returned no job id".to_string(),
                )
            })
    }

    async fn check_job(&self, job_id: &str) -> Result<JobPoll> {
        let output = self
            .client
            .get_document_text_detection()
            .job_id(job_id)
            .send()
            .await
            .map_err(|e| {
                PipelineError::ExtractionService(format!("GetDocumentTextDetection: {e}"))
            })?;

        match output.job_status() {
            Some(JobStatus::Succeeded) => {
                let mut lines = collect_lines(output.blocks());
                let pages = output
                    .document_metadata()
                    .and_then(|metadata| metadata.pages())
                    .map(|pages| pages as u32);

                // results of large jobs span several response pages
                let mut next = output.next_token().map(str::to_string);
                while let Some(token) = next {
                    let page = self
                        .client
                        .get_document_text_detection()
                        .job_id(job_id)
                        .next_token(token)
                        .send()
                        .await
                        .map_err(|e| {
                            PipelineError::ExtractionService(format!(
                                "GetDocumentTextDetection: {e}"
                            ))
                        })?;
                    lines.extend(collect_lines(page.blocks()));
                    next = page.next_token().map(str::to_string);
                }

                Ok(JobPoll::Succeeded(DetectedText { lines, pages }))
            }
            Some(JobStatus::Failed) => Ok(JobPoll::Failed {
                reason: output
                    .status_message()
                    .unwrap_or("extraction job failed")
                    .to_string(),
            }),
            Some(JobStatus::PartialSuccess) => Ok(JobPoll::Failed {
                reason: "extraction job reported partial success".to_string(),
            }),
            _ => Ok(JobPoll::InProgress),
        }
    }
}
