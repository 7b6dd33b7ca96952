// src/sources/mod.rs
//! Source adapters and the concurrent fan-out over them.

pub mod guardian;
pub mod newsapi;
pub mod nytimes;
pub mod throttle;

use crate::article::Article;
use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Upper bound on one upstream fetch before the source is treated as
/// failed for this request.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(12);

/// Errors a provider call can surface. All of them are contained at the
/// fan-out boundary; none abort the aggregation.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{provider}: unexpected status {status}")]
    Status {
        provider: &'static str,
        status: reqwest::StatusCode,
    },
    #[error("{provider}: rate limit exceeded")]
    RateLimited { provider: &'static str },
    #[error("{provider}: malformed payload: {detail}")]
    Payload {
        provider: &'static str,
        detail: String,
    },
}

/// One upstream news provider, normalized to the shared article schema.
#[async_trait::async_trait]
pub trait NewsSource: Send + Sync {
    /// Machine-readable id, e.g. "guardian".
    fn id(&self) -> &'static str;

    /// Human-readable name, e.g. "The Guardian".
    fn name(&self) -> &'static str;

    /// Whether upstream querying already restricts results to AI coverage.
    /// Sources answering `false` get the relevance gate applied downstream.
    fn ai_scoped(&self) -> bool;

    /// Fetch and normalize enough articles to cover `needed` result slots.
    /// Each adapter maps `needed` onto its own provider pagination units.
    async fn search(&self, query: Option<&str>, needed: usize)
        -> Result<Vec<Article>, SourceError>;
}

/// Result of one adapter call within a request.
pub struct FetchOutcome {
    pub source_id: &'static str,
    pub ai_scoped: bool,
    pub articles: Vec<Article>,
    pub failed: bool,
}

impl FetchOutcome {
    fn failure(source: &dyn NewsSource) -> Self {
        Self {
            source_id: source.id(),
            ai_scoped: source.ai_scoped(),
            articles: Vec::new(),
            failed: true,
        }
    }
}

/// Query every source concurrently, each call bounded by [`FETCH_TIMEOUT`].
/// Failures and timeouts are logged and become empty contributions, so one
/// bad provider never fails the whole aggregation. Outcomes come back in
/// the fixed adapter order, not completion order, keeping dedup tie-breaks
/// reproducible.
pub async fn fetch_all(
    sources: &[Arc<dyn NewsSource>],
    query: Option<&str>,
    needed: usize,
) -> Vec<FetchOutcome> {
    let tasks = sources.iter().map(|source| {
        let source = Arc::clone(source);
        let query = query.map(str::to_owned);
        async move {
            let t0 = std::time::Instant::now();
            let result =
                tokio::time::timeout(FETCH_TIMEOUT, source.search(query.as_deref(), needed)).await;
            histogram!("source_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

            match result {
                Ok(Ok(articles)) => {
                    tracing::debug!(source = source.id(), count = articles.len(), "source fetched");
                    FetchOutcome {
                        source_id: source.id(),
                        ai_scoped: source.ai_scoped(),
                        articles,
                        failed: false,
                    }
                }
                Ok(Err(e)) => {
                    tracing::warn!(error = ?e, source = source.id(), "source fetch failed");
                    counter!("aggregate_provider_errors_total").increment(1);
                    FetchOutcome::failure(source.as_ref())
                }
                Err(_) => {
                    tracing::warn!(
                        source = source.id(),
                        timeout_secs = FETCH_TIMEOUT.as_secs(),
                        "source fetch timed out"
                    );
                    counter!("aggregate_provider_errors_total").increment(1);
                    FetchOutcome::failure(source.as_ref())
                }
            }
        }
    });

    futures::future::join_all(tasks).await
}
