//! # Awful Ticker Sentiment
//!
//! A news sentiment pipeline that pulls headlines for a list of ticker
//! symbols from NewsAPI, scores each headline with a financial sentiment
//! classifier, and writes one CSV table per ticker.
//!
//! ## Features
//!
//! - Paginates the NewsAPI `everything` endpoint per ticker and date range
//! - Collapses duplicate headlines by `(headline, publishedAt)`
//! - Scores headlines with a hosted FinBERT endpoint or an OpenAI-compatible LLM
//! - Skips tickers whose output already exists, so interrupted runs resume cheaply
//!
//! ## Usage
//!
//! ```sh
//! NEWS_API_KEY=... awful_ticker_sentiment -t AAPL,MSFT -s 2024-01-01 -e 2024-01-31 -o ./sentiment
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture, one ticker at a time:
//! 1. **Cache check**: Skip the ticker if `{symbol}_sentiment.csv` exists
//! 2. **Fetching**: Page through NewsAPI and deduplicate headlines
//! 3. **Ordering**: Drop undated headlines and sort by publication time
//! 4. **Scoring**: Classify each headline and reduce it to a signed score
//! 5. **Output**: Write the scored table as CSV

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod classifier;
mod cli;
mod config;
mod dataset;
mod error;
mod models;
mod outputs;
mod pipeline;
mod sources;
mod utils;

use classifier::Backend;
use cli::Cli;
use config::Settings;
use error::SentimentError;
use pipeline::Pipeline;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // Parse CLI first so --log-level can seed the filter
    let args = Cli::parse();

    // --- Tracing init ---
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("awful_ticker_sentiment starting up");

    // Startup gate: without a key there is nothing to fetch
    let settings = match Settings::load(&args).await {
        Ok(settings) => settings,
        Err(SentimentError::MissingApiKey) => {
            error!("Missing NEWS_API_KEY in environment or config. Exiting.");
            return Ok(());
        }
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    debug!(?settings, "Resolved settings");

    let http = reqwest::Client::builder()
        .timeout(settings.request_timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;

    info!(kind = ?settings.classifier.kind, "Loading sentiment classifier");
    let classifier = Backend::from_settings(&settings.classifier, http.clone()).await?;

    let pipeline = Pipeline::new(&settings, http, classifier)?;
    let summary = pipeline.run().await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        saved = summary.saved,
        rows_written = summary.rows_written,
        skipped_cached = summary.skipped_cached,
        empty = summary.empty,
        failed = summary.failed.len(),
        "Execution complete"
    );

    Ok(())
}
