//! Data models for fetched headlines and their scored representations.
//!
//! This module defines the core data structures used throughout the application:
//! - [`HeadlineRecord`]: A raw headline as returned by the news API
//! - [`DatedHeadline`]: A headline whose publication timestamp parsed successfully
//! - [`SentimentResult`]: The label and confidence produced by the classifier
//! - [`SentimentRow`]: One row of the persisted per-ticker table
//!
//! The wire types ([`NewsPage`], [`WireArticle`]) mirror the news API's camelCase
//! JSON and are only used while decoding a page.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A headline as collected from one page of the news API.
///
/// Records are never mutated after the fetcher creates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlineRecord {
    /// The article title with surrounding whitespace removed.
    pub headline: String,
    /// The raw `publishedAt` string, empty when the API omitted it.
    pub published_at: String,
}

impl HeadlineRecord {
    /// The composite key used to collapse duplicate headlines.
    pub fn dedupe_key(&self) -> (String, String) {
        (self.headline.clone(), self.published_at.clone())
    }
}

/// A headline whose `publishedAt` value parsed into a UTC timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct DatedHeadline {
    pub headline: String,
    pub published_at: DateTime<Utc>,
}

/// The raw output of a sentiment classifier for one piece of text.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SentimentResult {
    /// The predicted class, passed through verbatim (e.g. `"Positive"`).
    pub label: String,
    /// The classifier's confidence in `label`, in `[0, 1]`.
    #[serde(alias = "score")]
    pub confidence: f64,
}

/// One row of a `{symbol}_sentiment.csv` file.
///
/// Field order is the column order of the file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentRow {
    pub headline: String,
    #[serde(rename = "publishedAt")]
    pub published_at: String,
    pub sentiment_score: f64,
}

impl SentimentRow {
    /// Build a row from a dated headline and its signed score.
    pub fn new(dated: &DatedHeadline, sentiment_score: f64) -> Self {
        Self {
            headline: dated.headline.clone(),
            published_at: dated
                .published_at
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
            sentiment_score,
        }
    }
}

/// One page of results from the news API's `everything` endpoint.
#[allow(non_snake_case)]
#[derive(Debug, Deserialize)]
pub struct NewsPage {
    #[serde(default)]
    pub articles: Vec<WireArticle>,
    #[serde(default)]
    pub totalResults: u64,
}

/// An article entry on a [`NewsPage`]; only the fields the pipeline reads.
#[allow(non_snake_case)]
#[derive(Debug, Deserialize)]
pub struct WireArticle {
    pub title: Option<String>,
    pub publishedAt: Option<String>,
}
