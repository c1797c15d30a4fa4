//! NewsAPI headline fetcher.
//!
//! Pages through the [`everything`](https://newsapi.org/docs/endpoints/everything)
//! endpoint for one symbol and date range, collecting one [`HeadlineRecord`]
//! per article.
//!
//! # Pagination
//!
//! Starting at page 1, pagination stops at the first of:
//! - a non-success response, transport failure, or undecodable body (logged)
//! - a page with no articles
//! - `page × page_size ≥ totalResults`
//!
//! Records from pages fetched before a failure are kept.

use crate::error::SentimentError;
use crate::models::{HeadlineRecord, NewsPage};
use crate::utils::truncate_for_log;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::{debug, error, info, instrument};
use url::Url;

/// Default number of articles requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Insertion-ordered set of headlines keyed by `(headline, published_at)`.
///
/// Re-inserting an existing key replaces the stored record but keeps the
/// position where the key was first seen.
#[derive(Debug, Default)]
pub struct HeadlineSet {
    positions: HashMap<(String, String), usize>,
    records: Vec<HeadlineRecord>,
}

impl HeadlineSet {
    pub fn insert(&mut self, record: HeadlineRecord) {
        match self.positions.entry(record.dedupe_key()) {
            Entry::Occupied(slot) => self.records[*slot.get()] = record,
            Entry::Vacant(slot) => {
                slot.insert(self.records.len());
                self.records.push(record);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// The unique records in first-occurrence order.
    pub fn into_records(self) -> Vec<HeadlineRecord> {
        self.records
    }
}

/// Client for the NewsAPI `everything` endpoint.
#[derive(Debug, Clone)]
pub struct HeadlineFetcher {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
    page_size: u32,
}

impl HeadlineFetcher {
    /// Create a fetcher. A `page_size` of zero is raised to one.
    pub fn new(
        http: reqwest::Client,
        endpoint: Url,
        api_key: impl Into<String>,
        page_size: u32,
    ) -> Self {
        Self {
            http,
            endpoint,
            api_key: api_key.into(),
            page_size: page_size.max(1),
        }
    }

    /// Fetch every headline for `symbol` published between `from` and `to`.
    ///
    /// Never fails: request errors are logged and truncate the result.
    #[instrument(level = "info", skip(self))]
    pub async fn fetch_headlines(&self, symbol: &str, from: &str, to: &str) -> Vec<HeadlineRecord> {
        let mut headlines = HeadlineSet::default();
        let mut page: u32 = 1;

        loop {
            let news_page = match self.fetch_page(symbol, from, to, page).await {
                Ok(news_page) => news_page,
                Err(e) => {
                    error!(
                        %symbol,
                        page,
                        error = %e,
                        kept = headlines.len(),
                        "[ERROR] NewsAPI request failed; stopping pagination"
                    );
                    break;
                }
            };

            if news_page.articles.is_empty() {
                debug!(%symbol, page, "Empty page; end of results");
                break;
            }

            let count = news_page.articles.len();
            for article in news_page.articles {
                let Some(title) = article.title else {
                    debug!(%symbol, page, "Skipping article without a title");
                    continue;
                };
                headlines.insert(HeadlineRecord {
                    headline: title.trim().to_string(),
                    published_at: article.publishedAt.unwrap_or_default(),
                });
            }
            debug!(
                %symbol,
                page,
                count,
                total_results = news_page.totalResults,
                "Fetched NewsAPI page"
            );

            if u64::from(page) * u64::from(self.page_size) >= news_page.totalResults {
                break;
            }
            page += 1;
        }

        info!(%symbol, pages = page, unique = headlines.len(), "Collected headlines");
        headlines.into_records()
    }

    /// Request and decode a single page.
    async fn fetch_page(
        &self,
        symbol: &str,
        from: &str,
        to: &str,
        page: u32,
    ) -> Result<NewsPage, SentimentError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", symbol)
            .append_pair("from", from)
            .append_pair("to", to)
            .append_pair("language", "en")
            .append_pair("pageSize", &self.page_size.to_string())
            .append_pair("page", &page.to_string())
            .append_pair("apiKey", &self.api_key)
            .append_pair("sortBy", "relevancy");

        // Errors carry the request URL by default, which includes the API key
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| e.without_url())?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SentimentError::Status {
                status: status.as_u16(),
                url: self.endpoint.to_string(),
                body: truncate_for_log(&body, 300),
            });
        }

        let body = resp.text().await.map_err(|e| e.without_url())?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::GET;
    use httpmock::MockServer;
    use serde_json::json;

    const PATH: &str = "/v2/everything";

    fn fetcher(server: &MockServer, page_size: u32) -> HeadlineFetcher {
        let endpoint = Url::parse(&format!("{}{}", server.base_url(), PATH)).unwrap();
        HeadlineFetcher::new(reqwest::Client::new(), endpoint, "test-key", page_size)
    }

    fn page_body(total: u64, articles: &[(&str, Option<&str>)]) -> String {
        let articles: Vec<_> = articles
            .iter()
            .map(|(title, published)| json!({ "title": title, "publishedAt": published }))
            .collect();
        json!({ "status": "ok", "totalResults": total, "articles": articles }).to_string()
    }

    fn numbered_page(total: u64, page: u32, count: usize) -> String {
        let titles: Vec<String> = (0..count).map(|i| format!("Headline {page}-{i}")).collect();
        let articles: Vec<(&str, Option<&str>)> = titles
            .iter()
            .map(|t| (t.as_str(), Some("2024-01-05T14:30:00Z")))
            .collect();
        page_body(total, &articles)
    }

    #[test]
    fn test_headline_set_keeps_first_position() {
        let mut set = HeadlineSet::default();
        let rec = |h: &str, p: &str| HeadlineRecord {
            headline: h.to_string(),
            published_at: p.to_string(),
        };
        set.insert(rec("A", "t1"));
        set.insert(rec("B", "t1"));
        set.insert(rec("A", "t1"));
        set.insert(rec("A", "t2"));

        let records = set.into_records();
        assert_eq!(
            records,
            vec![rec("A", "t1"), rec("B", "t1"), rec("A", "t2")]
        );
    }

    #[tokio::test]
    async fn test_fetch_stops_after_total_results_reached() {
        let server = MockServer::start();
        let mut mocks = Vec::new();
        for (page, count) in [(1u32, 100usize), (2, 100), (3, 50)] {
            let body = numbered_page(250, page, count);
            mocks.push(server.mock(|when, then| {
                when.method(GET)
                    .path(PATH)
                    .query_param("page", page.to_string());
                then.status(200)
                    .header("content-type", "application/json")
                    .body(body.clone());
            }));
        }
        let page_four = server.mock(|when, then| {
            when.method(GET).path(PATH).query_param("page", "4");
            then.status(200).body(page_body(250, &[]));
        });

        let records = fetcher(&server, 100)
            .fetch_headlines("AAPL", "2024-01-01", "2024-01-31")
            .await;

        for mock in &mocks {
            mock.assert_calls(1);
        }
        page_four.assert_calls(0);
        assert_eq!(records.len(), 250);
        assert_eq!(records[0].headline, "Headline 1-0");
        assert_eq!(records[249].headline, "Headline 3-49");
    }

    #[tokio::test]
    async fn test_fetch_sends_expected_query() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path(PATH)
                .query_param("q", "MSFT")
                .query_param("from", "2024-01-01")
                .query_param("to", "2024-01-31")
                .query_param("language", "en")
                .query_param("pageSize", "20")
                .query_param("page", "1")
                .query_param("apiKey", "test-key")
                .query_param("sortBy", "relevancy");
            then.status(200)
                .body(page_body(1, &[("  Padded title  ", None)]));
        });

        let records = fetcher(&server, 20)
            .fetch_headlines("MSFT", "2024-01-01", "2024-01-31")
            .await;

        mock.assert();
        assert_eq!(
            records,
            vec![HeadlineRecord {
                headline: "Padded title".to_string(),
                published_at: String::new(),
            }]
        );
    }

    #[tokio::test]
    async fn test_full_page_at_total_is_last_page() {
        let server = MockServer::start();
        let first = server.mock(|when, then| {
            when.method(GET).path(PATH).query_param("page", "1");
            then.status(200).body(numbered_page(10, 1, 10));
        });
        let second = server.mock(|when, then| {
            when.method(GET).path(PATH).query_param("page", "2");
            then.status(200).body(numbered_page(10, 2, 10));
        });

        let records = fetcher(&server, 10)
            .fetch_headlines("AAPL", "2024-01-01", "2024-01-31")
            .await;

        first.assert_calls(1);
        second.assert_calls(0);
        assert_eq!(records.len(), 10);
    }

    #[tokio::test]
    async fn test_empty_page_halts_before_total() {
        let server = MockServer::start();
        let first = server.mock(|when, then| {
            when.method(GET).path(PATH).query_param("page", "1");
            then.status(200).body(numbered_page(500, 1, 100));
        });
        let second = server.mock(|when, then| {
            when.method(GET).path(PATH).query_param("page", "2");
            then.status(200).body(page_body(500, &[]));
        });
        let third = server.mock(|when, then| {
            when.method(GET).path(PATH).query_param("page", "3");
            then.status(200).body(numbered_page(500, 3, 100));
        });

        let records = fetcher(&server, 100)
            .fetch_headlines("AAPL", "2024-01-01", "2024-01-31")
            .await;

        first.assert_calls(1);
        second.assert_calls(1);
        third.assert_calls(0);
        assert_eq!(records.len(), 100);
    }

    #[tokio::test]
    async fn test_error_status_keeps_earlier_pages() {
        let server = MockServer::start();
        let first = server.mock(|when, then| {
            when.method(GET).path(PATH).query_param("page", "1");
            then.status(200).body(numbered_page(300, 1, 100));
        });
        let second = server.mock(|when, then| {
            when.method(GET).path(PATH).query_param("page", "2");
            then.status(429)
                .body(r#"{"status":"error","code":"rateLimited"}"#);
        });
        let third = server.mock(|when, then| {
            when.method(GET).path(PATH).query_param("page", "3");
            then.status(200).body(numbered_page(300, 3, 100));
        });

        let records = fetcher(&server, 100)
            .fetch_headlines("AAPL", "2024-01-01", "2024-01-31")
            .await;

        first.assert_calls(1);
        second.assert_calls(1);
        third.assert_calls(0);
        assert_eq!(records.len(), 100);
        assert_eq!(records[99].headline, "Headline 1-99");
    }

    #[tokio::test]
    async fn test_error_on_first_page_returns_nothing() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path(PATH);
            then.status(401).body(r#"{"status":"error","code":"apiKeyInvalid"}"#);
        });

        let records = fetcher(&server, 100)
            .fetch_headlines("AAPL", "2024-01-01", "2024-01-31")
            .await;

        mock.assert_calls(1);
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_stops_pagination() {
        let server = MockServer::start();
        let first = server.mock(|when, then| {
            when.method(GET).path(PATH).query_param("page", "1");
            then.status(200).body(numbered_page(300, 1, 100));
        });
        let second = server.mock(|when, then| {
            when.method(GET).path(PATH).query_param("page", "2");
            then.status(200).body("<html>gateway</html>");
        });

        let records = fetcher(&server, 100)
            .fetch_headlines("AAPL", "2024-01-01", "2024-01-31")
            .await;

        first.assert_calls(1);
        second.assert_calls(1);
        assert_eq!(records.len(), 100);
    }

    #[tokio::test]
    async fn test_duplicates_across_pages_collapse() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(PATH).query_param("page", "1");
            then.status(200).body(page_body(
                4,
                &[
                    ("Company X beats estimates", Some("2024-01-05T14:30:00Z")),
                    ("Company X guidance raised", Some("2024-01-06T09:00:00Z")),
                ],
            ));
        });
        server.mock(|when, then| {
            when.method(GET).path(PATH).query_param("page", "2");
            then.status(200).body(page_body(
                4,
                &[
                    ("Company X beats estimates ", Some("2024-01-05T14:30:00Z")),
                    ("Company X beats estimates", Some("2024-01-07T08:00:00Z")),
                ],
            ));
        });

        let records = fetcher(&server, 2)
            .fetch_headlines("X", "2024-01-01", "2024-01-31")
            .await;

        let keys: Vec<(&str, &str)> = records
            .iter()
            .map(|r| (r.headline.as_str(), r.published_at.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("Company X beats estimates", "2024-01-05T14:30:00Z"),
                ("Company X guidance raised", "2024-01-06T09:00:00Z"),
                ("Company X beats estimates", "2024-01-07T08:00:00Z"),
            ]
        );
    }

    #[tokio::test]
    async fn test_articles_without_title_are_skipped() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(PATH);
            then.status(200).body(
                json!({
                    "status": "ok",
                    "totalResults": 2,
                    "articles": [
                        { "title": null, "publishedAt": "2024-01-05T14:30:00Z" },
                        { "title": "Kept", "publishedAt": "2024-01-05T15:30:00Z" }
                    ]
                })
                .to_string(),
            );
        });

        let records = fetcher(&server, 100)
            .fetch_headlines("AAPL", "2024-01-01", "2024-01-31")
            .await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].headline, "Kept");
    }

    #[test]
    fn test_zero_page_size_is_raised() {
        let endpoint = Url::parse("http://localhost/v2/everything").unwrap();
        let fetcher = HeadlineFetcher::new(reqwest::Client::new(), endpoint, "k", 0);
        assert_eq!(fetcher.page_size, 1);
    }
}
