//! Sentiment classification of headlines.
//!
//! The classifier itself is an external model; this module only defines the
//! seam it plugs into and the reduction of its output to a signed score.
//!
//! # Architecture
//!
//! - [`Classifier`]: Core trait, one piece of text in, one [`SentimentResult`] out
//! - [`InferenceClassifier`]: Hosted text-classification endpoint (FinBERT by default)
//! - [`LlmClassifier`]: OpenAI-compatible LLM through `awful_aj`
//! - [`Backend`]: Runtime choice between the two, built once per run
//! - [`SentimentScorer`]: Wraps any classifier and returns the signed score
//!
//! # Signed Score
//!
//! ```text
//! score = confidence × (+1 if label == "Positive" else −1)
//! ```
//!
//! Every label other than `"Positive"` counts as negative, a neutral class
//! included. Calls are never retried.

pub mod inference;
pub mod llm;

pub use inference::InferenceClassifier;
pub use llm::LlmClassifier;

use crate::config::{ClassifierKind, ClassifierSettings};
use crate::error::SentimentError;
use crate::models::SentimentResult;
use tracing::{debug, info, instrument};

/// The only label that yields a positive score.
pub const POSITIVE_LABEL: &str = "Positive";

/// Trait for classifying the sentiment of a piece of text.
///
/// Implementations are shared read-only for the whole run.
pub trait Classifier {
    /// Classify `text`, returning its label and confidence.
    async fn classify(&self, text: &str) -> Result<SentimentResult, SentimentError>;
}

/// Reduce a classifier result to a signed score in `[-1, 1]`.
///
/// Confidence is clamped into `[0, 1]` first.
pub fn signed_score(result: &SentimentResult) -> f64 {
    let confidence = result.confidence.clamp(0.0, 1.0);
    if result.label == POSITIVE_LABEL {
        confidence
    } else {
        -confidence
    }
}

/// Maps headlines to signed sentiment scores using a [`Classifier`].
#[derive(Debug)]
pub struct SentimentScorer<C> {
    classifier: C,
}

impl<C: Classifier> SentimentScorer<C> {
    pub fn new(classifier: C) -> Self {
        Self { classifier }
    }

    /// Classify one headline and return its signed score.
    #[instrument(level = "debug", skip_all)]
    pub async fn score(&self, headline: &str) -> Result<f64, SentimentError> {
        let result = self.classifier.classify(headline).await?;
        if !result.confidence.is_finite() {
            return Err(SentimentError::Classifier(format!(
                "non-finite confidence for label {}",
                result.label
            )));
        }
        let score = signed_score(&result);
        debug!(label = %result.label, confidence = result.confidence, score, "Scored headline");
        Ok(score)
    }
}

/// The classifier backend selected in the settings.
#[derive(Debug)]
pub enum Backend {
    Inference(InferenceClassifier),
    Llm(LlmClassifier),
}

impl Backend {
    /// Build the configured backend. The LLM backend loads its template and
    /// `awful_aj` config here, once.
    pub async fn from_settings(
        settings: &ClassifierSettings,
        http: reqwest::Client,
    ) -> Result<Self, SentimentError> {
        let backend = match settings.kind {
            ClassifierKind::Inference => Backend::Inference(InferenceClassifier::new(
                http,
                settings.endpoint.clone(),
                settings.api_token.clone(),
            )),
            ClassifierKind::Llm => Backend::Llm(
                LlmClassifier::load(&settings.llm_template)
                    .await
                    .map_err(|e| SentimentError::Classifier(e.to_string()))?,
            ),
        };
        info!(kind = ?settings.kind, "Classifier ready");
        Ok(backend)
    }
}

impl Classifier for Backend {
    async fn classify(&self, text: &str) -> Result<SentimentResult, SentimentError> {
        match self {
            Backend::Inference(inner) => inner.classify(text).await,
            Backend::Llm(inner) => inner.classify(text).await,
        }
    }
}
