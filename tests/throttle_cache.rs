// tests/throttle_cache.rs
//
// Behavior of the throttle components as composed by the rate-limited
// adapter: identical queries inside the TTL window are served from cache
// without a second upstream call, and cache expiry forces a refetch that
// still honors the request spacing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ai_news_hub::article::{article_id, Article};
use ai_news_hub::sources::throttle::{Clock, ManualClock, RateLimiter, ResultCache};

fn article(link: &str) -> Article {
    Article {
        id: article_id("throttled", link, 0),
        headline: "Machine learning update".to_string(),
        summary: "summary".to_string(),
        link: link.to_string(),
        image: None,
        read_time: "1 min read".to_string(),
        views: "2.0k".to_string(),
        author: None,
        published_at: "2024-05-01T10:00:00Z".to_string(),
        source: "Throttled".to_string(),
        source_id: "throttled".to_string(),
        section: None,
        tags: Vec::new(),
    }
}

/// The fetch path of a rate-limited provider: cache lookup, then limiter,
/// then one upstream call whose result is cached.
struct ThrottledFetcher {
    limiter: RateLimiter,
    cache: ResultCache<Vec<Article>>,
    upstream_calls: AtomicUsize,
}

impl ThrottledFetcher {
    fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            limiter: RateLimiter::with_clock(Duration::from_secs(6), clock.clone()),
            cache: ResultCache::with_clock(Duration::from_secs(300), clock),
            upstream_calls: AtomicUsize::new(0),
        }
    }

    async fn fetch(&self, query: &str) -> Vec<Article> {
        if let Some(hit) = self.cache.get(query) {
            return hit;
        }
        self.limiter.acquire().await;
        self.upstream_calls.fetch_add(1, Ordering::SeqCst);
        let result = vec![article(&format!("https://example.org/{query}"))];
        self.cache.put(query.to_string(), result.clone());
        result
    }
}

#[tokio::test(start_paused = true)]
async fn second_identical_query_within_ttl_hits_the_cache() {
    let clock = Arc::new(ManualClock::new());
    let fetcher = ThrottledFetcher::new(clock.clone());

    let first = fetcher.fetch("ai").await;
    let second = fetcher.fetch("ai").await;

    assert_eq!(first, second);
    assert_eq!(fetcher.upstream_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn different_queries_each_reach_upstream() {
    let clock = Arc::new(ManualClock::new());
    let fetcher = ThrottledFetcher::new(clock.clone());

    fetcher.fetch("ai").await;
    fetcher.fetch("robotics").await;

    assert_eq!(fetcher.upstream_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn expired_cache_entry_forces_a_refetch() {
    let clock = Arc::new(ManualClock::new());
    let fetcher = ThrottledFetcher::new(clock.clone());

    fetcher.fetch("ai").await;
    clock.advance(Duration::from_secs(301));
    fetcher.fetch("ai").await;

    assert_eq!(fetcher.upstream_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn upstream_calls_are_spaced_by_the_limiter() {
    let clock = Arc::new(ManualClock::new());
    let fetcher = ThrottledFetcher::new(clock.clone());

    let t0 = tokio::time::Instant::now();
    fetcher.fetch("ai").await;
    fetcher.fetch("robotics").await;

    // the manual clock never advances, so the limiter must sleep out
    // (nearly) the full six-second interval before the second call
    assert!(t0.elapsed() >= Duration::from_millis(5900));
    assert_eq!(fetcher.upstream_calls.load(Ordering::SeqCst), 2);
}
