//! Issuer and card-variant catalog.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One issuer with its known card variants, in lookup order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerEntry {
    /// Canonical issuer name as reported in the record.
    pub name: String,

    /// Variant names; the first one found in the statement wins.
    #[serde(default)]
    pub variants: Vec<String>,
}

impl IssuerEntry {
    pub fn new(name: &str, variants: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            variants: variants.iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// Ordered issuer -> variants lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerCatalog {
    pub issuers: Vec<IssuerEntry>,
}

impl Default for IssuerCatalog {
    fn default() -> Self {
        Self {
            issuers: vec![
                IssuerEntry::new(
                    "ICICI",
                    &["Coral", "Ruby", "Sapphiro", "Emerald", "Platinum", "Gold", "Titanium", "Signature"],
                ),
                IssuerEntry::new("HDFC", &["Regalia", "Millennia", "Infinia", "Platinum", "Emerald"]),
                IssuerEntry::new("SBI", &["Prime", "Elite", "Signature"]),
                IssuerEntry::new("AXIS", &["Ace", "Select", "Priority"]),
                IssuerEntry::new("KOTAK", &["Essentia", "Privilege", "Sapphiro", "Royale"]),
            ],
        }
    }
}

impl IssuerCatalog {
    /// Load a catalog from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate a catalog from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Reject entries that would make the issuer pattern match everything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for entry in &self.issuers {
            if entry.name.trim().is_empty() {
                return Err(ConfigError::Catalog("issuer with empty name".to_string()));
            }
            if entry.variants.iter().any(|v| v.trim().is_empty()) {
                return Err(ConfigError::Catalog(format!(
                    "issuer {} has an empty variant name",
                    entry.name
                )));
            }
        }
        Ok(())
    }

    /// Issuer names in catalog order.
    pub fn issuer_names(&self) -> impl Iterator<Item = &str> {
        self.issuers.iter().map(|e| e.name.as_str())
    }

    /// Case-insensitive lookup of an issuer entry.
    pub fn get(&self, issuer: &str) -> Option<&IssuerEntry> {
        self.issuers
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(issuer))
    }

    /// Variants of an issuer, empty when the issuer is not listed.
    pub fn variants(&self, issuer: &str) -> &[String] {
        self.get(issuer).map(|e| e.variants.as_slice()).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.issuers.is_empty()
    }
}
