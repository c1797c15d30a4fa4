//! Run settings resolved from the command line, the environment, and an
//! optional YAML file.
//!
//! Precedence is CLI/env first, then the YAML file, then built-in defaults.
//!
//! # YAML Format
//!
//! ```yaml
//! tickers: [AAPL, MSFT, NVDA]
//! start_date: 2024-01-01
//! end_date: 2024-01-31
//! cache_enabled: true
//! news_api_endpoint: https://newsapi.org/v2/everything
//! sentiment_dir: data/sentiment
//! classifier: inference
//! ```

use crate::cli::Cli;
use crate::error::SentimentError;
use chrono::{DateTime, NaiveDate};
use clap::ValueEnum;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{debug, instrument};
use url::Url;

pub const DEFAULT_NEWS_API_ENDPOINT: &str = "https://newsapi.org/v2/everything";
pub const DEFAULT_CLASSIFIER_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/ProsusAI/finbert";
pub const DEFAULT_LLM_TEMPLATE: &str = "finbert_sentiment";
pub const DEFAULT_SENTIMENT_DIR: &str = "data/sentiment";
pub const DEFAULT_PAGE_SIZE: u32 = crate::sources::newsapi::DEFAULT_PAGE_SIZE;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Which classifier backend scores headlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    /// Hosted text-classification endpoint (FinBERT by default).
    #[default]
    Inference,
    /// OpenAI-compatible LLM driven by an `awful_aj` chat template.
    Llm,
}

/// Settings as they appear in the YAML file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub tickers: Option<Vec<String>>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub cache_enabled: Option<bool>,
    pub news_api_key: Option<String>,
    pub news_api_endpoint: Option<String>,
    pub sentiment_dir: Option<PathBuf>,
    pub page_size: Option<u32>,
    pub request_timeout_secs: Option<u64>,
    pub classifier: Option<ClassifierKind>,
    pub classifier_endpoint: Option<String>,
    pub hf_api_token: Option<String>,
    pub llm_template: Option<String>,
}

impl FileConfig {
    /// Read and parse a YAML settings file.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Self, SentimentError> {
        let raw = fs::read_to_string(path).await.map_err(|e| {
            SentimentError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let parsed = serde_yaml::from_str(&raw).map_err(|e| {
            SentimentError::Config(format!("invalid YAML in {}: {e}", path.display()))
        })?;
        debug!("Loaded settings file");
        Ok(parsed)
    }
}

/// Classifier backend settings.
#[derive(Clone)]
pub struct ClassifierSettings {
    pub kind: ClassifierKind,
    pub endpoint: Url,
    pub api_token: Option<String>,
    pub llm_template: String,
}

/// Fully resolved settings for one pipeline run.
#[derive(Clone)]
pub struct Settings {
    pub tickers: Vec<String>,
    pub start_date: String,
    pub end_date: String,
    pub cache_enabled: bool,
    pub news_api_key: Option<String>,
    pub news_api_endpoint: Url,
    pub sentiment_dir: PathBuf,
    pub page_size: u32,
    pub request_timeout: Duration,
    pub classifier: ClassifierSettings,
}

impl Settings {
    /// Load the YAML file named by `--config` (if any) and merge it with `cli`.
    pub async fn load(cli: &Cli) -> Result<Self, SentimentError> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path).await?,
            None => FileConfig::default(),
        };
        Self::resolve(cli, file)
    }

    /// Merge CLI/env values over `file`, fill defaults, and validate.
    ///
    /// The API key is checked before anything else, so a run without a key
    /// reports [`SentimentError::MissingApiKey`] even when other settings are
    /// also invalid.
    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self, SentimentError> {
        let news_api_key = cli
            .news_api_key
            .clone()
            .or(file.news_api_key)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(SentimentError::MissingApiKey)?;

        let tickers = if cli.tickers.is_empty() {
            file.tickers.unwrap_or_default()
        } else {
            cli.tickers.clone()
        };
        let tickers = tickers
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        let start_date = cli
            .start_date
            .clone()
            .or(file.start_date)
            .ok_or_else(|| SentimentError::Config("start date is required".into()))?;
        let end_date = cli
            .end_date
            .clone()
            .or(file.end_date)
            .ok_or_else(|| SentimentError::Config("end date is required".into()))?;
        let start = parse_date(&start_date)?;
        let end = parse_date(&end_date)?;
        if start > end {
            return Err(SentimentError::Config(format!(
                "start date {start_date} is after end date {end_date}"
            )));
        }

        let cache_enabled = !cli.no_cache
            && cli
                .cache_enabled
                .or(file.cache_enabled)
                .unwrap_or(true);

        let news_api_endpoint = parse_url(
            cli.news_api_endpoint
                .as_deref()
                .or(file.news_api_endpoint.as_deref())
                .unwrap_or(DEFAULT_NEWS_API_ENDPOINT),
        )?;

        let classifier = ClassifierSettings {
            kind: cli.classifier.or(file.classifier).unwrap_or_default(),
            endpoint: parse_url(
                cli.classifier_endpoint
                    .as_deref()
                    .or(file.classifier_endpoint.as_deref())
                    .unwrap_or(DEFAULT_CLASSIFIER_ENDPOINT),
            )?,
            api_token: cli
                .hf_api_token
                .clone()
                .or(file.hf_api_token)
                .filter(|t| !t.trim().is_empty()),
            llm_template: cli
                .llm_template
                .clone()
                .or(file.llm_template)
                .unwrap_or_else(|| DEFAULT_LLM_TEMPLATE.to_string()),
        };

        Ok(Self {
            tickers,
            start_date,
            end_date,
            cache_enabled,
            news_api_key: Some(news_api_key),
            news_api_endpoint,
            sentiment_dir: cli
                .sentiment_dir
                .clone()
                .or(file.sentiment_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SENTIMENT_DIR)),
            page_size: cli
                .page_size
                .or(file.page_size)
                .unwrap_or(DEFAULT_PAGE_SIZE),
            request_timeout: Duration::from_secs(
                cli.request_timeout_secs
                    .or(file.request_timeout_secs)
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
            classifier,
        })
    }

    /// The news API key, or [`SentimentError::MissingApiKey`].
    pub fn api_key(&self) -> Result<&str, SentimentError> {
        self.news_api_key
            .as_deref()
            .ok_or(SentimentError::MissingApiKey)
    }
}

// Hand-written so the API key and token never reach the logs
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("tickers", &self.tickers)
            .field("start_date", &self.start_date)
            .field("end_date", &self.end_date)
            .field("cache_enabled", &self.cache_enabled)
            .field("news_api_key", &self.news_api_key.as_ref().map(|_| "<redacted>"))
            .field("news_api_endpoint", &self.news_api_endpoint.as_str())
            .field("sentiment_dir", &self.sentiment_dir)
            .field("page_size", &self.page_size)
            .field("request_timeout", &self.request_timeout)
            .field("classifier", &self.classifier.kind)
            .finish()
    }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
fn parse_date(raw: &str) -> Result<NaiveDate, SentimentError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| SentimentError::Config(format!("invalid date: {raw}")))
}

fn parse_url(raw: &str) -> Result<Url, SentimentError> {
    Url::parse(raw).map_err(|e| SentimentError::Config(format!("invalid URL {raw}: {e}")))
}
