//! Error type shared by the fetcher, classifier backends, and output writers.

use thiserror::Error;

/// The error type for all fallible operations in this crate.
#[derive(Debug, Error)]
pub enum SentimentError {
    /// An error occurred during an HTTP request.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server returned an unsuccessful HTTP status code.
    #[error("Unexpected response status: {status} at {url}: {body}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The URL that returned the error, with credentials stripped.
        url: String,
        /// A truncated copy of the response body.
        body: String,
    },

    /// A response body could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A provided URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Filesystem access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The scored table could not be serialized.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration was missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No news API key was supplied, so the pipeline declines to run.
    #[error("missing news API key")]
    MissingApiKey,

    /// The sentiment classifier failed or replied with something unusable.
    #[error("Classifier error: {0}")]
    Classifier(String),
}
