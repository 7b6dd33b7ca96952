// src/sources/throttle.rs
//! Rate limiting and short-TTL result caching for throttled providers.
//!
//! Both components are owned by the adapter instance and live for the
//! process lifetime. The clock is injectable so tests can drive TTL expiry
//! without sleeping.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Test clock advanced by hand.
pub struct ManualClock {
    origin: Instant,
    offset: StdMutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: StdMutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().expect("clock lock poisoned");
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock().expect("clock lock poisoned")
    }
}

/// Enforces a minimum delay between outbound requests to one provider.
pub struct RateLimiter {
    min_interval: Duration,
    clock: Arc<dyn Clock>,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self::with_clock(min_interval, Arc::new(SystemClock))
    }

    pub fn with_clock(min_interval: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            min_interval,
            clock,
            last_request: Mutex::new(None),
        }
    }

    /// Wait until the provider's minimum spacing has elapsed, then claim
    /// the slot. The lock is held across the sleep so concurrent requests
    /// queue up instead of racing past the limiter together.
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = self.clock.now().saturating_duration_since(prev);
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(self.clock.now());
    }
}

/// Process-local cache keyed by query parameters, with absolute TTL.
pub struct ResultCache<T> {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: StdMutex<HashMap<String, (Instant, T)>>,
}

impl<T: Clone> ResultCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: StdMutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<T> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        match entries.get(key) {
            Some((stored_at, value)) if now.saturating_duration_since(*stored_at) < self.ttl => {
                Some(value.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, key: impl Into<String>, value: T) {
        let now = self.clock.now();
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.insert(key.into(), (now, value));
    }
}
