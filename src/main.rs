//! AI News Hub — Binary Entrypoint
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.

use anyhow::Context;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ai_news_hub::api::{self, AppState};
use ai_news_hub::config::{self, AppConfig};
use ai_news_hub::keywords::KeywordTable;
use ai_news_hub::relevance::RelevanceFilter;
use ai_news_hub::sources::nytimes;
use ai_news_hub::telemetry::Metrics;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let telemetry = Metrics::init(nytimes::CACHE_TTL.as_secs());

    let keywords = Arc::new(KeywordTable::load().context("loading keyword table")?);
    let cfg = AppConfig::from_env();
    let sources = config::build_sources(&cfg, &keywords);
    if sources.is_empty() {
        tracing::warn!("no news source API keys configured; /api/news will serve empty pages");
    }

    let state = AppState {
        sources: Arc::new(sources),
        relevance: Arc::new(RelevanceFilter::new(keywords)),
    };
    let app = api::router(state).merge(telemetry.router());

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("binding {}", cfg.bind_addr))?;
    info!(addr = %cfg.bind_addr, "ai-news-hub listening");
    axum::serve(listener, app).await.context("serving")?;

    Ok(())
}
