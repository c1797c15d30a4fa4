//! Command-line interface definitions for Awful Ticker Sentiment.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Most arguments can be provided via command-line flags or environment
//! variables, and any of them may be left unset in favor of the YAML file
//! given with `--config` (see [`crate::config`]).

use crate::config::ClassifierKind;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the Awful Ticker Sentiment application.
///
/// # Examples
///
/// ```sh
/// # Everything from a config file
/// awful_ticker_sentiment -c sentiment.yaml
///
/// # Explicit tickers and dates, key from the environment
/// NEWS_API_KEY=... awful_ticker_sentiment -t AAPL,MSFT -s 2024-01-01 -e 2024-01-31
///
/// # Re-score everything, ignoring existing CSV files
/// awful_ticker_sentiment -c sentiment.yaml --no-cache
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Comma-separated ticker symbols
    #[arg(short, long, env = "TICKERS", value_delimiter = ',')]
    pub tickers: Vec<String>,

    /// Start of the date range (YYYY-MM-DD or RFC 3339)
    #[arg(short, long, env = "START_DATE")]
    pub start_date: Option<String>,

    /// End of the date range (YYYY-MM-DD or RFC 3339)
    #[arg(short, long, env = "END_DATE")]
    pub end_date: Option<String>,

    /// Skip tickers whose output CSV already exists
    #[arg(long, env = "CACHE_ENABLED")]
    pub cache_enabled: Option<bool>,

    /// Re-fetch and re-score every ticker even if its CSV exists
    #[arg(long)]
    pub no_cache: bool,

    /// NewsAPI key
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub news_api_key: Option<String>,

    /// NewsAPI `everything` endpoint
    #[arg(long, env = "NEWS_API_ENDPOINT")]
    pub news_api_endpoint: Option<String>,

    /// Output directory for the per-ticker sentiment CSV files
    #[arg(short = 'o', long, env = "SENTIMENT_DIR")]
    pub sentiment_dir: Option<PathBuf>,

    /// Articles requested per NewsAPI page
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Timeout in seconds for each HTTP request
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,

    /// Sentiment classifier backend
    #[arg(long, value_enum)]
    pub classifier: Option<ClassifierKind>,

    /// Text-classification inference endpoint (inference backend)
    #[arg(long, env = "CLASSIFIER_ENDPOINT")]
    pub classifier_endpoint: Option<String>,

    /// Bearer token for the inference endpoint
    #[arg(long, env = "HF_API_TOKEN", hide_env_values = true)]
    pub hf_api_token: Option<String>,

    /// Chat template name (llm backend)
    #[arg(long)]
    pub llm_template: Option<String>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}
