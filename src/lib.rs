// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregate;
pub mod api;
pub mod article;
pub mod config;
pub mod keywords;
pub mod relevance;
pub mod sources;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::article::{Article, NewsResponse, ResponseStatus};
pub use crate::keywords::KeywordTable;
pub use crate::relevance::RelevanceFilter;
pub use crate::sources::{NewsSource, SourceError};
