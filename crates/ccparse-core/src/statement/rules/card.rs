//! Masked card number and card variant resolution.

use regex::Regex;
use tracing::{debug, trace};

use super::patterns::{CARD_LINE, MASKED_NUMBER};
use super::{ExtractionMatch, FieldExtractor};
use crate::models::catalog::IssuerCatalog;
use crate::models::statement::MaskedCardNumber;

/// Unlabelled masked card number extractor.
pub struct CardNumberExtractor;

impl CardNumberExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CardNumberExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for CardNumberExtractor {
    type Output = ExtractionMatch<MaskedCardNumber>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        MASKED_NUMBER
            .captures_iter(text)
            .filter_map(|caps| {
                let number = MaskedCardNumber::from_last_four(&caps[1])?;
                let full_match = caps.get(0)?;
                Some(ExtractionMatch::from_regex_match(number, full_match))
            })
            .collect()
    }
}

/// Precompiled variant patterns per issuer, in catalog order.
#[derive(Debug, Clone)]
pub struct VariantCatalog {
    issuers: Vec<(String, Vec<(String, Regex)>)>,
}

impl VariantCatalog {
    pub fn new(catalog: &IssuerCatalog) -> Self {
        let issuers = catalog
            .issuers
            .iter()
            .map(|entry| {
                let issuer = regex::escape(entry.name.trim());
                let variants = entry
                    .variants
                    .iter()
                    .filter_map(|variant| {
                        let pattern = format!(
                            r"(?i)(?:{}\s+)?{}",
                            issuer,
                            regex::escape(variant.trim())
                        );
                        Regex::new(&pattern).ok().map(|re| (variant.trim().to_string(), re))
                    })
                    .collect();
                (entry.name.clone(), variants)
            })
            .collect();

        Self { issuers }
    }

    /// First catalog variant of `issuer` that appears anywhere in `text`.
    pub fn find_variant(&self, text: &str, issuer: &str) -> Option<String> {
        let (_, variants) = self
            .issuers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(issuer))?;

        for (variant, pattern) in variants {
            if pattern.is_match(text) {
                debug!("Variant {} resolved from {} catalog", variant, issuer);
                return Some(variant.clone());
            }
        }
        None
    }
}

/// Resolved card number and variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardDetails {
    pub number: Option<MaskedCardNumber>,
    pub variant: Option<String>,
}

/// Resolve card number and variant together.
///
/// A labelled "Card ... XXXX XXXX XXXX dddd" line is preferred because it may
/// name the variant right next to the number. Without it, the first masked
/// number anywhere is used. In both cases a missing variant is looked up in
/// the issuer's catalog entry.
pub fn extract_card(text: &str, issuer: Option<&str>, variants: &VariantCatalog) -> CardDetails {
    let catalog_variant = || issuer.and_then(|i| variants.find_variant(text, i));

    if let Some(caps) = CARD_LINE.captures(text) {
        trace!("Card line matched: {}", &caps[0]);
        let number = MaskedCardNumber::from_last_four(&caps[2]);
        let variant = match caps.get(1) {
            Some(v) if !v.as_str().trim().is_empty() => Some(v.as_str().trim().to_string()),
            _ => catalog_variant(),
        };
        return CardDetails { number, variant };
    }

    debug!("No labelled card line, searching for a bare masked number");
    CardDetails {
        number: CardNumberExtractor::new().extract(text).map(|m| m.value),
        variant: catalog_variant(),
    }
}
