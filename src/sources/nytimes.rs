// src/sources/nytimes.rs
//! NYTimes Article Search adapter (api.nytimes.com).
//!
//! The provider allows roughly ten requests a minute, so outbound calls go
//! through a [`RateLimiter`] with a six-second floor and identical queries
//! are served from a five-minute [`ResultCache`]. A 429 empties out instead
//! of failing so an overloaded provider never blocks the other sources.

use async_trait::async_trait;
use chrono::Utc;
use metrics::counter;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::article::{self, Article};
use crate::keywords::KeywordTable;
use crate::sources::throttle::{RateLimiter, ResultCache};
use crate::sources::{NewsSource, SourceError};

const BASE_URL: &str = "https://api.nytimes.com/svc/search/v2/articlesearch.json";
const USER_AGENT: &str = "AI-News-Hub/1.0";
const PROVIDER: &str = "nytimes";
const SOURCE_NAME: &str = "The New York Times";
const IMAGE_HOST: &str = "https://static01.nyt.com/";
const PLACEHOLDER_SUMMARY: &str = "Read the full article for more details.";

/// Six seconds between requests keeps us under the documented ~10/minute.
pub const RATE_LIMIT_INTERVAL: Duration = Duration::from_secs(6);
pub const CACHE_TTL: Duration = Duration::from_secs(300);

/// Only fetch articles from the last six months.
const BEGIN_DATE_WINDOW_DAYS: i64 = 180;

/// Topic filter when the user supplied their own free-text query.
const SEARCH_FQ: &str = r#"section.name:("Technology" OR "Science" OR "Business") OR timesTag.subject:("Artificial Intelligence" OR "Machine Learning" OR "Technology")"#;
/// Topic filter for the default browse query.
const DEFAULT_FQ: &str = r#"typeOfMaterials:("News" OR "Article") AND (section.name:("Technology" OR "Science" OR "Business") OR timesTag.subject:("Artificial Intelligence" OR "Machine Learning" OR "Technology" OR "Computer Science"))"#;

#[derive(Debug, Deserialize)]
struct NytEnvelope {
    response: NytResponse,
}

#[derive(Debug, Deserialize)]
struct NytResponse {
    docs: Option<Vec<NytDoc>>,
}

#[derive(Debug, Deserialize)]
struct NytDoc {
    #[serde(rename = "abstract")]
    summary: Option<String>,
    web_url: String,
    snippet: Option<String>,
    lead_paragraph: Option<String>,
    #[serde(default)]
    multimedia: Option<NytMultimedia>,
    headline: NytHeadline,
    #[serde(default)]
    keywords: Vec<NytKeyword>,
    pub_date: Option<String>,
    news_desk: Option<String>,
    section_name: Option<String>,
    #[serde(default)]
    byline: Option<NytByline>,
    word_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct NytMultimedia {
    default: Option<NytImage>,
    thumbnail: Option<NytImage>,
}

#[derive(Debug, Deserialize)]
struct NytImage {
    url: String,
}

#[derive(Debug, Deserialize)]
struct NytHeadline {
    main: String,
}

#[derive(Debug, Deserialize)]
struct NytKeyword {
    name: String,
    value: String,
    major: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NytByline {
    original: Option<String>,
    #[serde(default)]
    person: Vec<NytPerson>,
}

#[derive(Debug, Deserialize)]
struct NytPerson {
    firstname: Option<String>,
    lastname: Option<String>,
}

pub struct NytimesSource {
    api_key: String,
    client: reqwest::Client,
    keywords: Arc<KeywordTable>,
    limiter: RateLimiter,
    cache: ResultCache<Vec<Article>>,
}

impl NytimesSource {
    pub fn new(api_key: String, keywords: Arc<KeywordTable>) -> Self {
        Self::with_throttle(
            api_key,
            keywords,
            RateLimiter::new(RATE_LIMIT_INTERVAL),
            ResultCache::new(CACHE_TTL),
        )
    }

    /// Construction with injected throttle components, for tests that need
    /// a controlled clock.
    pub fn with_throttle(
        api_key: String,
        keywords: Arc<KeywordTable>,
        limiter: RateLimiter,
        cache: ResultCache<Vec<Article>>,
    ) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
            keywords,
            limiter,
            cache,
        }
    }

    fn query_plan(&self, user_query: Option<&str>) -> (String, &'static str) {
        match user_query.map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => (q.to_string(), SEARCH_FQ),
            None => (self.keywords.query_disjunction(), DEFAULT_FQ),
        }
    }

    fn transform_doc(doc: NytDoc, index: usize) -> Article {
        let summary = doc
            .summary
            .or(doc.lead_paragraph)
            .or(doc.snippet)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| PLACEHOLDER_SUMMARY.to_string());

        let read_time = match doc.word_count {
            Some(words) if words > 0 => article::read_time_from_words(words),
            _ => article::read_time(&summary),
        };

        let image = doc.multimedia.and_then(|m| {
            m.default
                .or(m.thumbnail)
                .map(|img| qualify_image_url(&img.url))
        });

        let author = doc
            .byline
            .and_then(|b| {
                b.person
                    .first()
                    .and_then(|p| {
                        let full = format!(
                            "{} {}",
                            p.firstname.as_deref().unwrap_or_default(),
                            p.lastname.as_deref().unwrap_or_default()
                        );
                        let full = full.trim().to_string();
                        (!full.is_empty()).then_some(full)
                    })
                    .or_else(|| {
                        b.original
                            .map(|o| o.trim_start_matches("By ").trim().to_string())
                            .filter(|o| !o.is_empty())
                    })
            })
            .unwrap_or_else(|| SOURCE_NAME.to_string());

        let tags: Vec<String> = doc
            .keywords
            .into_iter()
            .filter(|k| k.major.as_deref() == Some("N") || k.name == "subject")
            .map(|k| k.value)
            .collect();

        Article {
            id: article::article_id(PROVIDER, &doc.web_url, index),
            headline: doc.headline.main,
            summary,
            link: doc.web_url,
            image,
            read_time,
            views: article::synthetic_views(2_000, 10_000),
            author: Some(author),
            published_at: doc.pub_date.unwrap_or_default(),
            source: SOURCE_NAME.to_string(),
            source_id: PROVIDER.to_string(),
            section: doc.section_name.or(doc.news_desk),
            tags,
        }
    }
}

fn qualify_image_url(url: &str) -> String {
    if url.starts_with("http") {
        url.to_string()
    } else {
        format!("{IMAGE_HOST}{url}")
    }
}

#[async_trait]
impl NewsSource for NytimesSource {
    fn id(&self) -> &'static str {
        PROVIDER
    }

    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn ai_scoped(&self) -> bool {
        true
    }

    async fn search(
        &self,
        query: Option<&str>,
        _needed: usize,
    ) -> Result<Vec<Article>, SourceError> {
        let (term, fq) = self.query_plan(query);
        let cache_key = format!("{term}|{fq}");

        if let Some(hit) = self.cache.get(&cache_key) {
            tracing::debug!(source = PROVIDER, "serving cached result");
            counter!("source_cache_hits_total").increment(1);
            return Ok(hit);
        }

        self.limiter.acquire().await;

        let begin_date = (Utc::now() - chrono::Duration::days(BEGIN_DATE_WINDOW_DAYS))
            .format("%Y%m%d")
            .to_string();

        let response = self
            .client
            .get(BASE_URL)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&[
                ("api-key", self.api_key.as_str()),
                ("q", term.as_str()),
                ("fq", fq),
                ("sort", "newest"),
                ("begin_date", begin_date.as_str()),
                ("page", "0"),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            // degrade to an empty contribution so the other sources still serve
            tracing::warn!(source = PROVIDER, "rate limited upstream, returning empty set");
            counter!("aggregate_provider_errors_total").increment(1);
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(SourceError::Status {
                provider: PROVIDER,
                status,
            });
        }

        let envelope: NytEnvelope = response
            .json()
            .await
            .map_err(|e| SourceError::Payload {
                provider: PROVIDER,
                detail: e.to_string(),
            })?;

        let articles: Vec<Article> = envelope
            .response
            .docs
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, doc)| Self::transform_doc(doc, i))
            .collect();

        counter!("source_articles_total").increment(articles.len() as u64);
        self.cache.put(cache_key, articles.clone());
        Ok(articles)
    }
}
