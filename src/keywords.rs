// src/keywords.rs
//! Shared AI keyword table: one versioned list consumed by both the
//! relevance gate and the adapters' query augmentation.

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_KEYWORDS_PATH: &str = "config/keywords.toml";
pub const ENV_KEYWORDS_PATH: &str = "NEWS_KEYWORDS_PATH";

/// Copy compiled into the binary; used when no override path is set.
const EMBEDDED_KEYWORDS: &str = include_str!("../config/keywords.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct KeywordTable {
    #[serde(default)]
    pub version: u32,
    /// Substrings matched against lowercased headline + summary.
    pub relevance: Vec<String>,
    /// Terms OR-ed into upstream search queries.
    pub query: Vec<String>,
    /// Ordered section-derivation categories; first match wins.
    #[serde(default)]
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub name: String,
    pub terms: Vec<String>,
}

impl KeywordTable {
    /// Parse a table from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let table: KeywordTable = toml::from_str(toml_str)?;
        if table.relevance.is_empty() {
            anyhow::bail!("keyword table has no relevance terms");
        }
        if table.query.is_empty() {
            anyhow::bail!("keyword table has no query terms");
        }
        Ok(table)
    }

    /// The embedded default table. The embedded copy is validated by unit
    /// tests, so a parse failure here is a build defect.
    pub fn embedded() -> Self {
        Self::from_toml_str(EMBEDDED_KEYWORDS).expect("embedded keyword table parses")
    }

    /// Load from $NEWS_KEYWORDS_PATH when set, otherwise the embedded copy.
    pub fn load() -> anyhow::Result<Self> {
        match std::env::var(ENV_KEYWORDS_PATH) {
            Ok(p) => {
                let path = PathBuf::from(p);
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("reading keyword table from {}", path.display()))?;
                Self::from_toml_str(&content)
                    .with_context(|| format!("parsing keyword table from {}", path.display()))
            }
            Err(_) => Ok(Self::embedded()),
        }
    }

    /// `"a OR b OR c"` form consumed by the upstream search providers.
    pub fn query_disjunction(&self) -> String {
        self.query.join(" OR ")
    }

    /// Derive a display section from headline + summary for providers that
    /// carry no section metadata. First matching category wins.
    pub fn categorize(&self, headline: &str, summary: Option<&str>) -> String {
        let content = format!("{} {}", headline, summary.unwrap_or_default()).to_lowercase();
        for cat in &self.categories {
            if cat.terms.iter().any(|t| content.contains(t.as_str())) {
                return cat.name.clone();
            }
        }
        "General AI".to_string()
    }
}
