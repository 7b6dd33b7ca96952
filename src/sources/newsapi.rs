// src/sources/newsapi.rs
//! Generic news-search provider (newsapi.org `everything` endpoint).
//!
//! The upstream query is a fixed OR-disjunction of the shared AI terms, so
//! results are only loosely on-topic; the relevance gate runs downstream.
//! Free-text narrowing also happens downstream, which keeps this adapter's
//! single 50-article batch identical across pages of one browse session.

use async_trait::async_trait;
use metrics::counter;
use serde::Deserialize;
use std::sync::Arc;

use crate::article::{self, Article};
use crate::keywords::KeywordTable;
use crate::sources::{NewsSource, SourceError};

const BASE_URL: &str = "https://newsapi.org/v2/everything";
const USER_AGENT: &str = "AI-News-Hub/1.0";
const PROVIDER: &str = "newsapi";
const SOURCE_NAME: &str = "NewsAPI";
const BATCH_SIZE: &str = "50";
const PLACEHOLDER_SUMMARY: &str = "No description available";
/// Tombstone NewsAPI substitutes for withdrawn articles.
const REMOVED: &str = "[Removed]";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiResponse {
    #[allow(dead_code)]
    status: String,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    #[serde(default)]
    author: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    url_to_image: Option<String>,
    published_at: Option<String>,
    content: Option<String>,
}

pub struct NewsApiSource {
    api_key: String,
    client: reqwest::Client,
    keywords: Arc<KeywordTable>,
}

impl NewsApiSource {
    pub fn new(api_key: String, keywords: Arc<KeywordTable>) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
            keywords,
        }
    }

    fn transform_batch(&self, payload: NewsApiResponse) -> Vec<Article> {
        payload
            .articles
            .into_iter()
            .filter(|a| {
                a.url.is_some()
                    && a.title.as_deref().is_some_and(|t| !t.is_empty() && t != REMOVED)
                    && a.description.as_deref() != Some(REMOVED)
            })
            .enumerate()
            .map(|(index, a)| self.transform_article(a, index))
            .collect()
    }

    fn transform_article(&self, a: NewsApiArticle, index: usize) -> Article {
        let headline = a.title.unwrap_or_default();
        let link = a.url.unwrap_or_default();
        let summary = a
            .description
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| PLACEHOLDER_SUMMARY.to_string());
        let body = a.content.as_deref().unwrap_or(&summary);
        let section = self.keywords.categorize(&headline, Some(&summary));

        Article {
            id: article::article_id(PROVIDER, &link, index),
            read_time: article::read_time(body),
            views: article::synthetic_views(1_000, 51_000),
            headline,
            summary,
            link,
            image: a.url_to_image.filter(|u| !u.is_empty()),
            author: a.author.filter(|s| !s.is_empty()),
            published_at: a.published_at.unwrap_or_default(),
            source: SOURCE_NAME.to_string(),
            source_id: PROVIDER.to_string(),
            section: Some(section),
            tags: Vec::new(),
        }
    }
}

#[async_trait]
impl NewsSource for NewsApiSource {
    fn id(&self) -> &'static str {
        PROVIDER
    }

    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn ai_scoped(&self) -> bool {
        false
    }

    async fn search(
        &self,
        _query: Option<&str>,
        _needed: usize,
    ) -> Result<Vec<Article>, SourceError> {
        let query = self.keywords.query_disjunction();

        let response = self
            .client
            .get(BASE_URL)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&[
                ("q", query.as_str()),
                ("sortBy", "publishedAt"),
                ("language", "en"),
                ("pageSize", BATCH_SIZE),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited { provider: PROVIDER });
        }
        if !status.is_success() {
            return Err(SourceError::Status {
                provider: PROVIDER,
                status,
            });
        }

        let payload: NewsApiResponse =
            response
                .json()
                .await
                .map_err(|e| SourceError::Payload {
                    provider: PROVIDER,
                    detail: e.to_string(),
                })?;

        let articles = self.transform_batch(payload);
        counter!("source_articles_total").increment(articles.len() as u64);
        Ok(articles)
    }
}
