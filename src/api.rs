// src/api.rs
//! The aggregation endpoint: parameter parsing, source fan-out, relevance
//! gating, merge/sort/paginate, and the response envelope.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use metrics::counter;
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use crate::aggregate::{self, PAGE_SIZE};
use crate::article::NewsResponse;
use crate::relevance::RelevanceFilter;
use crate::sources::{self, NewsSource};

#[derive(Clone)]
pub struct AppState {
    pub sources: Arc<Vec<Arc<dyn NewsSource>>>,
    pub relevance: Arc<RelevanceFilter>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/news", get(news).options(news_preflight))
        .layer(cors_layer())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

#[derive(Debug, Default, Deserialize)]
pub struct NewsQuery {
    #[serde(default)]
    search: Option<String>,
    /// Kept as a raw string so malformed values degrade to page 1 instead
    /// of rejecting the request.
    #[serde(default)]
    page: Option<String>,
    /// Comma-separated source ids; absent means all configured sources.
    #[serde(default)]
    sources: Option<String>,
}

fn parse_page(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1)
}

fn enabled_sources(
    all: &[Arc<dyn NewsSource>],
    selector: Option<&str>,
) -> Vec<Arc<dyn NewsSource>> {
    match selector.map(str::trim).filter(|s| !s.is_empty()) {
        Some(list) => {
            let wanted: HashSet<&str> = list.split(',').map(str::trim).collect();
            all.iter()
                .filter(|s| wanted.contains(s.id()))
                .cloned()
                .collect()
        }
        None => all.to_vec(),
    }
}

async fn news(State(state): State<AppState>, Query(params): Query<NewsQuery>) -> Response {
    counter!("aggregate_requests_total").increment(1);

    let page = parse_page(params.page.as_deref());
    let search = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let enabled = enabled_sources(&state.sources, params.sources.as_deref());

    // enough merged articles to fill every page up to the requested one
    let needed = page * PAGE_SIZE;

    let outcomes = sources::fetch_all(&enabled, search, needed).await;

    let attempted = outcomes.len();
    let failures = outcomes.iter().filter(|o| o.failed).count();
    if attempted > 0 && failures == attempted {
        counter!("aggregate_failures_total").increment(1);
        tracing::error!(attempted, "all news sources failed");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(NewsResponse::error(
                "Failed to fetch news",
                "all configured news sources failed",
            )),
        )
            .into_response();
    }

    // relevance gate, only for sources that are not AI-scoped upstream
    let batches: Vec<_> = outcomes
        .into_iter()
        .map(|o| {
            if o.ai_scoped {
                o.articles
            } else {
                o.articles
                    .into_iter()
                    .filter(|a| state.relevance.is_relevant(&a.headline, Some(&a.summary)))
                    .collect()
            }
        })
        .collect();

    let mut merged = aggregate::merge_dedup(batches);
    if let Some(q) = search {
        merged = aggregate::search_filter(merged, q);
    }
    aggregate::sort_newest_first(&mut merged);

    let window = aggregate::page_window(page, search.is_some());
    let (slice, total_results) = aggregate::paginate(merged, window);

    counter!("aggregate_articles_served_total").increment(slice.len() as u64);
    tracing::info!(
        page,
        total_results,
        returned = slice.len(),
        search = search.is_some(),
        sources = attempted,
        failed = failures,
        "news page served"
    );

    Json(NewsResponse::ok(slice, total_results)).into_response()
}

/// CORS preflight for local UI development.
async fn news_preflight() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
    )
}
