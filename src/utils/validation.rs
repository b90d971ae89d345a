// file: src/utils/validation.rs
// description: data validation utilities and helpers
// reference: input validation patterns

use crate::error::{PipelineError, Result};
use std::fs;
use std::path::Path;

pub struct Validator;

impl Validator {
    pub fn validate_file_path(path: &Path) -> Result<()> {
        let canonical = fs::canonicalize(path).map_err(|e| {
            PipelineError::Validation(format!(
                "Cannot canonicalize path {}: {}",
                path.display(),
                e
            ))
        })?;

        if !canonical.is_file() {
            return Err(PipelineError::Validation(format!(
                "Path is not a file: {}",
                canonical.display()
            )));
        }

        Ok(())
    }

    /// Audit ids become storage key prefixes, so only key-safe
    /// characters are allowed.
    pub fn validate_audit_id(audit_id: &str) -> Result<()> {
        if audit_id.is_empty() || audit_id.len() > 64 {
            return Err(PipelineError::Validation(format!(
                "Audit id must be 1-64 characters: '{audit_id}'"
            )));
        }

        let safe = audit_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !safe {
            return Err(PipelineError::Validation(format!(
                "Audit id may only contain letters, digits, '-' and '_': '{audit_id}'"
            )));
        }

        Ok(())
    }

    pub fn validate_not_blank(value: &str, field: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(PipelineError::Validation(format!(
                "{field} must not be blank"
            )));
        }
        Ok(())
    }

    pub fn validate_content_not_empty(bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Err(PipelineError::Validation(
                "Uploaded file is empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn validate_upload_size(len: u64, max_mb: usize) -> Result<()> {
        let max_bytes = max_mb as u64 * 1024 * 1024;
        if len > max_bytes {
            return Err(PipelineError::Validation(format!(
                "File too large: {len} bytes (max {max_mb} MB)"
            )));
        }
        Ok(())
    }

    pub fn validate_bucket_name(bucket: &str) -> Result<()> {
        let len_ok = (3..=63).contains(&bucket.len());
        let chars_ok = bucket
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.');
        let edges_ok = bucket
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphanumeric())
            && bucket
                .chars()
                .last()
                .is_some_and(|c| c.is_ascii_alphanumeric());

        if !(len_ok && chars_ok && edges_ok) {
            return Err(PipelineError::Validation(format!(
                "Invalid bucket name: '{bucket}'"
            )));
        }

        Ok(())
    }

    pub fn sanitize_file_name(file_name: &str) -> String {
        file_name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }

    pub fn truncate_text(text: &str, max_length: usize) -> String {
        if text.len() <= max_length {
            return text.to_string();
        }

        let mut end = max_length;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &text[..end])
    }
}
