// src/sources/guardian.rs
//! Guardian Open Platform adapter (content.guardianapis.com).
//!
//! The boolean query ANDs the shared AI disjunction onto any user query, so
//! results arrive already on-topic. The provider pages in units of 20 (max
//! 50); the adapter walks up to three pages to cover the slots the endpoint
//! asked for.

use async_trait::async_trait;
use metrics::counter;
use serde::Deserialize;
use std::sync::Arc;

use crate::article::{self, Article};
use crate::keywords::KeywordTable;
use crate::sources::{NewsSource, SourceError};

const BASE_URL: &str = "https://content.guardianapis.com/search";
const USER_AGENT: &str = "AI-News-Hub/1.0";
const PROVIDER: &str = "guardian";
const SOURCE_NAME: &str = "The Guardian";
const PAGE_SIZE: usize = 20;
const MAX_PAGES: usize = 3;
const SHOW_FIELDS: &str = "thumbnail,bodyText,trailText,headline,standfirst,byline";
const SHOW_TAGS: &str = "keyword,contributor";
const PLACEHOLDER_SUMMARY: &str = "Read the full article for more details.";

#[derive(Debug, Deserialize)]
struct GuardianEnvelope {
    response: GuardianResponse,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GuardianResponse {
    #[allow(dead_code)]
    status: String,
    #[serde(default)]
    results: Vec<GuardianItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GuardianItem {
    web_title: String,
    web_url: String,
    web_publication_date: Option<String>,
    section_name: Option<String>,
    #[serde(default)]
    fields: Option<GuardianFields>,
    #[serde(default)]
    tags: Vec<GuardianTag>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GuardianFields {
    thumbnail: Option<String>,
    body_text: Option<String>,
    trail_text: Option<String>,
    headline: Option<String>,
    standfirst: Option<String>,
    byline: Option<String>,
    main: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GuardianTag {
    web_title: String,
}

pub struct GuardianSource {
    api_key: String,
    client: reqwest::Client,
    keywords: Arc<KeywordTable>,
}

impl GuardianSource {
    pub fn new(api_key: String, keywords: Arc<KeywordTable>) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
            keywords,
        }
    }

    fn build_query(&self, user_query: Option<&str>) -> String {
        let disjunction = self.keywords.query_disjunction();
        match user_query.map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => format!("({q}) AND ({disjunction})"),
            None => disjunction,
        }
    }

    async fn fetch_page(&self, query: &str, page: usize) -> Result<Vec<GuardianItem>, SourceError> {
        let page_param = page.to_string();
        let page_size_param = PAGE_SIZE.to_string();

        let response = self
            .client
            .get(BASE_URL)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&[
                ("api-key", self.api_key.as_str()),
                ("q", query),
                ("page", page_param.as_str()),
                ("page-size", page_size_param.as_str()),
                ("order-by", "newest"),
                ("show-fields", SHOW_FIELDS),
                ("show-tags", SHOW_TAGS),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited { provider: PROVIDER });
        }
        if !status.is_success() {
            // 403 covers both bad keys and exhausted quotas
            return Err(SourceError::Status {
                provider: PROVIDER,
                status,
            });
        }

        let envelope: GuardianEnvelope =
            response
                .json()
                .await
                .map_err(|e| SourceError::Payload {
                    provider: PROVIDER,
                    detail: e.to_string(),
                })?;
        Ok(envelope.response.results)
    }

    fn transform_article(item: GuardianItem, index: usize) -> Article {
        let fields = item.fields.unwrap_or_default();
        let headline = fields
            .headline
            .filter(|h| !h.is_empty())
            .unwrap_or(item.web_title);
        let summary = fields
            .trail_text
            .or(fields.standfirst)
            .filter(|s| !s.is_empty())
            .map(|s| article::clean_text(&s))
            .unwrap_or_else(|| PLACEHOLDER_SUMMARY.to_string());
        let body = fields.body_text.as_deref().unwrap_or(&summary);

        Article {
            id: article::article_id(PROVIDER, &item.web_url, index),
            read_time: article::read_time(body),
            views: article::synthetic_views(1_000, 6_000),
            headline,
            summary,
            link: item.web_url,
            image: fields.thumbnail.or(fields.main).filter(|u| !u.is_empty()),
            author: Some(
                fields
                    .byline
                    .filter(|b| !b.is_empty())
                    .unwrap_or_else(|| SOURCE_NAME.to_string()),
            ),
            published_at: item.web_publication_date.unwrap_or_default(),
            source: SOURCE_NAME.to_string(),
            source_id: PROVIDER.to_string(),
            section: item.section_name,
            tags: item.tags.into_iter().map(|t| t.web_title).collect(),
        }
    }
}

#[async_trait]
impl NewsSource for GuardianSource {
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
        needed: usize,
    ) -> Result<Vec<Article>, SourceError> {
        let q = self.build_query(query);
        let pages_to_fetch = needed.div_ceil(PAGE_SIZE).clamp(1, MAX_PAGES);

        let mut out = Vec::new();
        for page in 1..=pages_to_fetch {
            let items = self.fetch_page(&q, page).await?;
            let batch_len = items.len();
            let base = out.len();
            out.extend(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| Self::transform_article(item, base + i)),
            );
            // a short page means the provider has run out of results
            if batch_len < PAGE_SIZE {
                break;
            }
        }

        counter!("source_articles_total").increment(out.len() as u64);
        Ok(out)
    }
}
