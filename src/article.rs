// src/article.rs
//! The normalized article schema all source adapters produce, plus the
//! response envelope and the shared display-metric helpers.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Reading speed used for the `readTime` estimate.
const WORDS_PER_MINUTE: usize = 200;

/// Common shape every adapter normalizes into. Built fresh per request,
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Opaque id, unique within one response.
    pub id: String,
    pub headline: String,
    pub summary: String,
    /// Canonical URL; the deduplication key.
    pub link: String,
    /// `None` means the client renders its own placeholder.
    pub image: Option<String>,
    pub read_time: String,
    pub views: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// ISO-8601, passed through from the provider.
    pub published_at: String,
    pub source: String,
    pub source_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Article {
    /// Instant used for temporal ordering. Unparseable dates become the
    /// Unix epoch so they sort last instead of failing the request.
    pub fn published_instant(&self) -> DateTime<Utc> {
        parse_published(&self.published_at)
    }
}

pub fn parse_published(raw: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Utc);
    }
    // NYTimes emits offsets without a colon ("+0000"), which RFC 3339
    // parsing rejects.
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        return dt.with_timezone(&Utc);
    }
    DateTime::<Utc>::UNIX_EPOCH
}

/// Strip HTML and collapse whitespace before counting words or displaying
/// provider-supplied snippets.
pub fn clean_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out.trim().to_string()
}

/// `"{n} min read"` at 200 words per minute, minimum one minute.
pub fn read_time(text: &str) -> String {
    let words = clean_text(text).split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    format!("{minutes} min read")
}

/// Read-time estimate straight from a provider-supplied word count.
pub fn read_time_from_words(words: usize) -> String {
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    format!("{minutes} min read")
}

/// Synthetic view counter for display. The providers expose no analytics,
/// so the UI gets a plausible placeholder, e.g. `"4.2k"`.
pub fn synthetic_views(min: u32, max: u32) -> String {
    use rand::Rng;
    let views = rand::rng().random_range(min..max);
    format!("{:.1}k", f64::from(views) / 1000.0)
}

/// Opaque per-response article id: source id, a short hash of the link,
/// and the position within the adapter's batch.
pub fn article_id(source_id: &str, link: &str, index: usize) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(link.as_bytes());
    let digest = hasher.finalize();
    let mut short = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut short, "{:02x}", b);
    }
    format!("{source_id}-{short}-{index}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Ok,
    Error,
}

/// Envelope returned by `GET /api/news`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsResponse {
    pub articles: Vec<Article>,
    pub total_results: usize,
    pub status: ResponseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl NewsResponse {
    pub fn ok(articles: Vec<Article>, total_results: usize) -> Self {
        Self {
            articles,
            total_results,
            status: ResponseStatus::Ok,
            error: None,
            message: None,
        }
    }

    pub fn error(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            articles: Vec::new(),
            total_results: 0,
            status: ResponseStatus::Error,
            error: Some(error.into()),
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_article(link: &str, published_at: &str) -> Article {
    Article {
        id: article_id("test", link, 0),
        headline: format!("Article at {link}"),
        summary: "summary".to_string(),
        link: link.to_string(),
        image: None,
        read_time: "1 min read".to_string(),
        views: "1.0k".to_string(),
        author: None,
        published_at: published_at.to_string(),
        source: "Test".to_string(),
        source_id: "test".to_string(),
        section: None,
        tags: Vec::new(),
    }
}
