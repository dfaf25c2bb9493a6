//! Issuer detection.

use regex::Regex;
use tracing::debug;

use super::{ExtractionMatch, FieldExtractor};
use crate::models::catalog::IssuerCatalog;

/// Finds the first whole-word, case-insensitive mention of a catalog issuer.
#[derive(Debug, Clone)]
pub struct IssuerExtractor {
    /// Canonical names, index-aligned with the pattern's alternation.
    names: Vec<String>,
    pattern: Option<Regex>,
}

impl IssuerExtractor {
    pub fn new(catalog: &IssuerCatalog) -> Self {
        let names: Vec<String> = catalog.issuer_names().map(str::to_string).collect();

        let pattern = if catalog.is_empty() {
            None
        } else {
            let alternation = names
                .iter()
                .map(|n| regex::escape(n.trim()))
                .collect::<Vec<_>>()
                .join("|");
            Regex::new(&format!(r"(?i)\b({})\b", alternation)).ok()
        };

        Self { names, pattern }
    }

    fn canonical(&self, matched: &str) -> String {
        self.names
            .iter()
            .find(|n| n.trim().eq_ignore_ascii_case(matched))
            .cloned()
            .unwrap_or_else(|| matched.to_uppercase())
    }
}

impl FieldExtractor for IssuerExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let pattern = self.pattern.as_ref()?;
        let m = pattern.find(text)?;
        let issuer = self.canonical(m.as_str());
        debug!("Issuer {} found at byte {}", issuer, m.start());
        Some(ExtractionMatch::from_regex_match(issuer, m))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let Some(pattern) = self.pattern.as_ref() else {
            return Vec::new();
        };
        pattern
            .find_iter(text)
            .map(|m| ExtractionMatch::from_regex_match(self.canonical(m.as_str()), m))
            .collect()
    }
}
