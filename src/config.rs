// src/config.rs
//! Environment-driven configuration and source construction.

use crate::keywords::KeywordTable;
use crate::sources::{guardian::GuardianSource, newsapi::NewsApiSource, nytimes::NytimesSource, NewsSource};
use std::sync::Arc;

pub const ENV_NEWSAPI_KEY: &str = "NEWSAPI_API_KEY";
pub const ENV_GUARDIAN_KEY: &str = "GUARDIAN_API_KEY";
pub const ENV_NYTIMES_KEY: &str = "NYTIMES_API_KEY";
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub newsapi_key: Option<String>,
    pub guardian_key: Option<String>,
    pub nytimes_key: Option<String>,
    pub bind_addr: String,
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            newsapi_key: non_empty_var(ENV_NEWSAPI_KEY),
            guardian_key: non_empty_var(ENV_GUARDIAN_KEY),
            nytimes_key: non_empty_var(ENV_NYTIMES_KEY),
            bind_addr: non_empty_var(ENV_BIND_ADDR)
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        }
    }
}

/// Build the configured adapters in their fixed aggregation order.
///
/// The order is load-bearing: merge tie-breaks on duplicate links go to the
/// earlier adapter. A missing key skips that source, it is not an error.
pub fn build_sources(cfg: &AppConfig, keywords: &Arc<KeywordTable>) -> Vec<Arc<dyn NewsSource>> {
    let mut sources: Vec<Arc<dyn NewsSource>> = Vec::new();

    match &cfg.newsapi_key {
        Some(key) => sources.push(Arc::new(NewsApiSource::new(key.clone(), keywords.clone()))),
        None => tracing::info!("{ENV_NEWSAPI_KEY} not configured, skipping NewsAPI"),
    }
    match &cfg.guardian_key {
        Some(key) => sources.push(Arc::new(GuardianSource::new(key.clone(), keywords.clone()))),
        None => tracing::info!("{ENV_GUARDIAN_KEY} not configured, skipping The Guardian"),
    }
    match &cfg.nytimes_key {
        Some(key) => sources.push(Arc::new(NytimesSource::new(key.clone(), keywords.clone()))),
        None => tracing::info!("{ENV_NYTIMES_KEY} not configured, skipping The New York Times"),
    }

    sources
}

#[cfg(test)]
mod tests {
    use super::*;

    #[serial_test::serial]
    #[test]
    fn missing_keys_skip_sources() {
        let cfg = AppConfig {
            guardian_key: Some("g-key".to_string()),
            ..AppConfig::default()
        };
        let keywords = Arc::new(KeywordTable::embedded());
        let sources = build_sources(&cfg, &keywords);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].id(), "guardian");
    }

    #[serial_test::serial]
    #[test]
    fn from_env_treats_blank_as_absent() {
        std::env::set_var(ENV_NEWSAPI_KEY, "   ");
        std::env::remove_var(ENV_GUARDIAN_KEY);
        std::env::set_var(ENV_NYTIMES_KEY, "nyt-key");
        std::env::remove_var(ENV_BIND_ADDR);

        let cfg = AppConfig::from_env();
        assert!(cfg.newsapi_key.is_none());
        assert!(cfg.guardian_key.is_none());
        assert_eq!(cfg.nytimes_key.as_deref(), Some("nyt-key"));
        assert_eq!(cfg.bind_addr, DEFAULT_BIND_ADDR);

        std::env::remove_var(ENV_NEWSAPI_KEY);
        std::env::remove_var(ENV_NYTIMES_KEY);
    }

    #[serial_test::serial]
    #[test]
    fn adapter_order_is_fixed() {
        let cfg = AppConfig {
            newsapi_key: Some("n".to_string()),
            guardian_key: Some("g".to_string()),
            nytimes_key: Some("t".to_string()),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        };
        let keywords = Arc::new(KeywordTable::embedded());
        let ids: Vec<&str> = build_sources(&cfg, &keywords)
            .iter()
            .map(|s| s.id())
            .collect();
        assert_eq!(ids, vec!["newsapi", "guardian", "nytimes"]);
    }
}
