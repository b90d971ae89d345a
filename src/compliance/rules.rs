// file: src/compliance/rules.rs
// description: deterministic keyword rule deciding document compliance
// reference: internal compliance rules

use crate::models::AuditRequest;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TOKEN_PATTERN: Regex =
        Regex::new(r"[A-Za-z0-9][A-Za-z0-9/-]*").expect("Invalid token pattern");
}

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "for", "in", "of", "on", "or", "the", "to", "with",
];
const MIN_KEYWORD_LEN: usize = 3;

/// Keyword evidence for one extraction. The decision hangs on the
/// primary keyword, the first significant token of the requested
/// document name; remaining keywords are reported as supporting
/// evidence only.
#[derive(Debug, Clone)]
pub struct KeywordEvidence {
    pub primary: String,
    pub primary_matched: bool,
    /// First extracted line containing the primary keyword.
    pub primary_line: Option<String>,
    pub matched: Vec<String>,
    pub missing: Vec<String>,
}

impl KeywordEvidence {
    pub fn evaluate(request: &AuditRequest, lines: &[String]) -> Self {
        let tokens = name_tokens(&request.document_name);
        let primary = tokens
            .iter()
            .find(|token| !STOPWORDS.contains(&token.as_str()))
            .or_else(|| tokens.first())
            .cloned()
            .unwrap_or_else(|| request.document_name.trim().to_lowercase());

        let mut keywords = vec![primary.clone()];
        for token in &tokens {
            if token.len() >= MIN_KEYWORD_LEN
                && !STOPWORDS.contains(&token.as_str())
                && !keywords.contains(token)
            {
                keywords.push(token.clone());
            }
        }

        let lowered: Vec<String> = lines.iter().map(|line| line.to_lowercase()).collect();
        let mut matched = Vec::new();
        let mut missing = Vec::new();
        for keyword in keywords {
            if lowered.iter().any(|line| line.contains(&keyword)) {
                matched.push(keyword);
            } else {
                missing.push(keyword);
            }
        }

        let primary_matched = matched.contains(&primary);
        let primary_line = lines
            .iter()
            .find(|line| line.to_lowercase().contains(&primary))
            .cloned();

        Self {
            primary,
            primary_matched,
            primary_line,
            matched,
            missing,
        }
    }

    pub fn is_compliant(&self) -> bool {
        self.primary_matched
    }
}

fn name_tokens(document_name: &str) -> Vec<String> {
    TOKEN_PATTERN
        .find_iter(document_name)
        .map(|token| token.as_str().to_lowercase())
        .collect()
}
