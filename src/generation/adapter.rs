// file: src/generation/adapter.rs
// description: language model adapter with retry and degraded summaries
// reference: internal module structure

use crate::compliance::KeywordEvidence;
use crate::error::{PipelineError, Result};
use crate::generation::generator::TextGenerator;
use crate::generation::prompts;
use crate::models::{AuditRequest, ComplianceVerdict, ExtractionResult, ExtractionStatus};
use crate::utils::validation::Validator;
use std::sync::Arc;
use tracing::{debug, warn};

pub const SUMMARY_UNAVAILABLE_NOTE: &str = "Summary unavailable";

/// Replacement shown when the generation service stays unreachable.
/// The raw request text is carried so the reader still sees what was
/// asked for.
pub fn degraded_summary(request: &AuditRequest) -> String {
    format!(
        "{SUMMARY_UNAVAILABLE_NOTE}. Requested document: {}",
        request.display_line()
    )
}

/// Wraps the generation service with a bounded retry. Summaries
/// degrade to a placeholder on persistent failure; compliance
/// judgments propagate the error instead, because a verdict without
/// its explanation is not deliverable.
#[derive(Clone)]
pub struct LanguageModel {
    generator: Arc<dyn TextGenerator>,
    retries: u32,
}

impl LanguageModel {
    pub fn new(generator: Arc<dyn TextGenerator>, retries: u32) -> Self {
        Self { generator, retries }
    }

    async fn generate_with_retry(&self, prompt: &str) -> Result<String> {
        let mut attempt: u32 = 0;
        loop {
            match self.generator.generate(prompt).await {
                Ok(text) => return Ok(text.trim().to_string()),
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    warn!("Generation attempt {} failed, retrying: {}", attempt, e);
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn summarize_or_degrade(&self, prompt: String, request: &AuditRequest) -> String {
        match self.generate_with_retry(&prompt).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("Falling back to degraded summary: {}", e);
                degraded_summary(request)
            }
        }
    }

    /// Plain-language summary produced right after the auditor submits
    /// a request.
    pub async fn summarize(&self, request: &AuditRequest) -> String {
        self.summarize_or_degrade(prompts::request_summary(request), request)
            .await
    }

    /// Plain-language summary produced when the auditee reviews the
    /// current request.
    pub async fn summarize_for_review(&self, request: &AuditRequest) -> String {
        self.summarize_or_degrade(prompts::review_summary(request), request)
            .await
    }

    /// Judges whether extracted text satisfies the request. Only a
    /// succeeded extraction is judged.
    pub async fn judge_compliance(
        &self,
        request: &AuditRequest,
        extraction: &ExtractionResult,
    ) -> Result<ComplianceVerdict> {
        if extraction.status != ExtractionStatus::Succeeded {
            return Err(PipelineError::Validation(format!(
                "compliance judgment needs a succeeded extraction, got '{}'",
                extraction.status
            )));
        }

        let evidence = KeywordEvidence::evaluate(request, &extraction.lines);

        if evidence.is_compliant() {
            if let Some(line) = &evidence.primary_line {
                debug!(
                    "Primary keyword '{}' found in: {}",
                    evidence.primary,
                    Validator::truncate_text(line, 80)
                );
            }

            let rationale = self
                .generate_with_retry(&prompts::compliant_rationale(request, &extraction.lines))
                .await?;

            Ok(ComplianceVerdict::compliant(
                extraction.document_id.clone(),
                rationale,
                evidence.matched,
                evidence.missing,
            ))
        } else {
            debug!(
                "Primary keyword '{}' missing, requesting corrective example",
                evidence.primary
            );

            let corrective = self
                .generate_with_retry(&prompts::corrective_message(request, &extraction.lines))
                .await?;
            let rationale = format!(
                "No extracted line mentions '{}' for requested document '{}'",
                evidence.primary, request.document_name
            );

            Ok(ComplianceVerdict::non_compliant(
                extraction.document_id.clone(),
                rationale,
                corrective,
                evidence.matched,
                evidence.missing,
            ))
        }
    }
}
