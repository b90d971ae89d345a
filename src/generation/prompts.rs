// file: src/generation/prompts.rs
// description: prompt templates for summaries and compliance messages
// reference: internal prompt wording

use crate::models::AuditRequest;

const REQUEST_SUMMARY_TEMPLATE: &str = "Summarize this audit request for a non-expert and give \
     one concrete example:\nDocument: {document_name}\nDescription: {description}";

const REVIEW_SUMMARY_TEMPLATE: &str = "Summarize these audit requests in plain English for a \
     non-expert and give an example for each:\n\n- {request_line}";

const COMPLIANT_RATIONALE_TEMPLATE: &str = "You are a compliance assistant. The uploaded \
     document matches the audit request. OCR detected: {detected}. The request was \
     {request_line}. Write one short paragraph citing the detected text as evidence that this \
     is the requested document.";

const CORRECTIVE_TEMPLATE: &str = "You are a compliance assistant. You received the wrong \
     document. OCR detected: {detected}. We were looking for {document_name}. Generate a \
     message explaining the mismatch and an example of the correct document format.";

const EXCERPT_LINES: usize = 5;

pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn render(&self, values: &[(&str, &str)]) -> String {
        let mut result = self.template.clone();

        for (key, value) in values {
            let placeholder = format!("{{{key}}}");
            result = result.replace(&placeholder, value);
        }

        result
    }
}

/// Summary prompt shown to the auditor right after submission.
pub fn request_summary(request: &AuditRequest) -> String {
    PromptTemplate::new(REQUEST_SUMMARY_TEMPLATE).render(&[
        ("document_name", &request.document_name),
        ("description", &request.description),
    ])
}

/// Summary prompt shown to the auditee when reviewing the current request.
pub fn review_summary(request: &AuditRequest) -> String {
    PromptTemplate::new(REVIEW_SUMMARY_TEMPLATE)
        .render(&[("request_line", &request.display_line())])
}

pub fn compliant_rationale(request: &AuditRequest, lines: &[String]) -> String {
    PromptTemplate::new(COMPLIANT_RATIONALE_TEMPLATE).render(&[
        ("detected", &detected_excerpt(lines)),
        ("request_line", &request.display_line()),
    ])
}

pub fn corrective_message(request: &AuditRequest, lines: &[String]) -> String {
    PromptTemplate::new(CORRECTIVE_TEMPLATE).render(&[
        ("detected", &detected_excerpt(lines)),
        ("document_name", &request.document_name),
    ])
}

fn detected_excerpt(lines: &[String]) -> String {
    if lines.is_empty() {
        return "(no text detected)".to_string();
    }

    let mut excerpt = lines
        .iter()
        .take(EXCERPT_LINES)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    if lines.len() > EXCERPT_LINES {
        excerpt.push_str(" ...");
    }
    excerpt
}
