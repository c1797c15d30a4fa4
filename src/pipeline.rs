//! Per-ticker fetch, score, and persist orchestration.
//!
//! # Ticker Lifecycle
//!
//! ```text
//! PENDING ──► SKIPPED_CACHED                    (cache on, CSV exists)
//!    │
//!    └──► FETCHING ──► EMPTY_SKIPPED            (no headlines)
//!             │
//!             └──► SCORING ──► SAVED
//!                     │
//!                     └──► FAILED               (classifier or write error)
//! ```
//!
//! Tickers are processed one at a time, pages are fetched one at a time, and
//! headlines are scored one at a time in dataset order. Nothing is written
//! for a ticker until all of its rows are scored, so `EMPTY_SKIPPED` and
//! `FAILED` tickers are picked up again by the next run.

use crate::classifier::{Classifier, SentimentScorer};
use crate::config::Settings;
use crate::dataset::build_dataset;
use crate::error::SentimentError;
use crate::models::{DatedHeadline, SentimentRow};
use crate::outputs::csv::write_sentiment;
use crate::sources::HeadlineFetcher;
use crate::utils::{ensure_writable_dir, output_path};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::path::PathBuf;
use tracing::{error, info, instrument, warn};

/// Terminal state of one ticker in a run.
#[derive(Debug)]
pub enum TickerOutcome {
    /// Output already existed and caching is on; nothing was fetched.
    SkippedCached,
    /// The news API returned no headlines; nothing was written.
    EmptySkipped,
    /// The scored table was written.
    Saved { rows: usize },
    /// Scoring or writing failed; nothing was written.
    Failed { error: SentimentError },
}

/// Tally of ticker outcomes for one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub saved: usize,
    pub rows_written: usize,
    pub skipped_cached: usize,
    pub empty: usize,
    /// `SYMBOL: error` for each ticker that failed; these are retried next run.
    pub failed: Vec<String>,
}

impl RunSummary {
    fn record(&mut self, symbol: &str, outcome: &TickerOutcome) {
        match outcome {
            TickerOutcome::SkippedCached => self.skipped_cached += 1,
            TickerOutcome::EmptySkipped => self.empty += 1,
            TickerOutcome::Saved { rows } => {
                self.saved += 1;
                self.rows_written += rows;
            }
            TickerOutcome::Failed { error } => self.failed.push(format!("{symbol}: {error}")),
        }
    }
}

/// The sentiment pipeline for one run's settings.
pub struct Pipeline<C> {
    fetcher: HeadlineFetcher,
    scorer: SentimentScorer<C>,
    tickers: Vec<String>,
    start_date: String,
    end_date: String,
    cache_enabled: bool,
    sentiment_dir: PathBuf,
}

impl<C: Classifier> Pipeline<C> {
    /// Assemble a pipeline from resolved settings.
    ///
    /// # Errors
    ///
    /// [`SentimentError::MissingApiKey`] when no news API key is configured;
    /// the caller should decline to run.
    pub fn new(
        settings: &Settings,
        http: reqwest::Client,
        classifier: C,
    ) -> Result<Self, SentimentError> {
        let api_key = settings.api_key()?;
        Ok(Self {
            fetcher: HeadlineFetcher::new(
                http,
                settings.news_api_endpoint.clone(),
                api_key,
                settings.page_size,
            ),
            scorer: SentimentScorer::new(classifier),
            tickers: settings.tickers.clone(),
            start_date: settings.start_date.clone(),
            end_date: settings.end_date.clone(),
            cache_enabled: settings.cache_enabled,
            sentiment_dir: settings.sentiment_dir.clone(),
        })
    }

    /// Process every ticker in order.
    ///
    /// # Errors
    ///
    /// Only fails if the output directory cannot be created or written;
    /// per-ticker problems are logged and counted in the summary.
    #[instrument(level = "info", skip_all, fields(dir = %self.sentiment_dir.display()))]
    pub async fn run(&self) -> Result<RunSummary, SentimentError> {
        ensure_writable_dir(&self.sentiment_dir).await?;
        info!(
            tickers = self.tickers.len(),
            start = %self.start_date,
            end = %self.end_date,
            cache_enabled = self.cache_enabled,
            "Starting sentiment pipeline"
        );

        let mut summary = RunSummary::default();
        for symbol in &self.tickers {
            let outcome = self.process_ticker(symbol).await;
            summary.record(symbol, &outcome);
        }

        info!(
            saved = summary.saved,
            rows_written = summary.rows_written,
            skipped_cached = summary.skipped_cached,
            empty = summary.empty,
            failed = summary.failed.len(),
            "Sentiment pipeline complete"
        );
        for failure in &summary.failed {
            warn!(%failure, "Ticker failed; it will be retried on the next run");
        }
        Ok(summary)
    }

    /// Run one ticker through the lifecycle described in the module docs.
    #[instrument(level = "info", skip(self))]
    pub async fn process_ticker(&self, symbol: &str) -> TickerOutcome {
        let out_path = output_path(&self.sentiment_dir, symbol);
        if self.cache_enabled && out_path.exists() {
            info!(path = %out_path.display(), "[SKIP] Cached sentiment found");
            return TickerOutcome::SkippedCached;
        }

        info!("[FETCH] Headlines");
        let raw = self
            .fetcher
            .fetch_headlines(symbol, &self.start_date, &self.end_date)
            .await;
        if raw.is_empty() {
            warn!("[EMPTY] No headlines");
            return TickerOutcome::EmptySkipped;
        }

        let dataset = build_dataset(raw);
        info!(rows = dataset.len(), "[SCORE] Scoring headlines");
        let rows = match self.score_rows(&dataset).await {
            Ok(rows) => rows,
            Err(e) => {
                error!(error = %e, "Scoring failed; nothing written");
                return TickerOutcome::Failed { error: e };
            }
        };

        if let Err(e) = write_sentiment(&rows, &out_path).await {
            error!(path = %out_path.display(), error = %e, "Failed writing sentiment CSV");
            return TickerOutcome::Failed { error: e };
        }
        info!(rows = rows.len(), path = %out_path.display(), "[SAVED]");
        TickerOutcome::Saved { rows: rows.len() }
    }

    /// Score rows sequentially, stopping at the first classifier error.
    async fn score_rows(
        &self,
        dataset: &[DatedHeadline],
    ) -> Result<Vec<SentimentRow>, SentimentError> {
        let scorer = &self.scorer;
        stream::iter(dataset)
            .then(move |row| async move {
                let score = scorer.score(&row.headline).await?;
                Ok::<_, SentimentError>(SentimentRow::new(row, score))
            })
            .try_collect()
            .await
    }
}
