//! News sources for fetching ticker headlines.
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | NewsAPI `everything` | [`newsapi`] | Paginated JSON API | Requires API key |
//!
//! # Common Patterns
//!
//! A source exposes a fetcher whose `fetch_headlines(symbol, from, to)`
//! returns an ordered, deduplicated `Vec<HeadlineRecord>`. Request failures
//! are logged and end the fetch for that symbol early; whatever was collected
//! before the failure is still returned.

pub mod newsapi;

pub use newsapi::HeadlineFetcher;
