//! Hosted text-classification endpoint backend.
//!
//! Sends `{"inputs": headline}` to a Hugging Face style inference endpoint
//! and takes the highest-confidence label from the reply. Both reply shapes
//! the endpoint produces are accepted:
//!
//! ```text
//! [[{"label": "positive", "score": 0.91}, {"label": "neutral", "score": 0.06}, ...]]
//! [{"label": "positive", "score": 0.91}, ...]
//! ```

use super::Classifier;
use crate::error::SentimentError;
use crate::models::SentimentResult;
use crate::utils::truncate_for_log;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{instrument, warn};
use url::Url;

#[derive(Serialize)]
struct InferencePayload<'a> {
    inputs: &'a str,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InferenceReply {
    Nested(Vec<Vec<SentimentResult>>),
    Flat(Vec<SentimentResult>),
}

/// Classifier backed by a remote text-classification model.
#[derive(Clone)]
pub struct InferenceClassifier {
    http: reqwest::Client,
    endpoint: Url,
    api_token: Option<String>,
}

impl std::fmt::Debug for InferenceClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceClassifier")
            .field("endpoint", &self.endpoint.as_str())
            .field("authenticated", &self.api_token.is_some())
            .finish()
    }
}

impl InferenceClassifier {
    pub fn new(http: reqwest::Client, endpoint: Url, api_token: Option<String>) -> Self {
        Self {
            http,
            endpoint,
            api_token,
        }
    }
}

/// Pick the top-scoring candidate from a decoded reply.
fn top_candidate(reply: InferenceReply) -> Option<SentimentResult> {
    let candidates = match reply {
        InferenceReply::Nested(batches) => batches.into_iter().next().unwrap_or_default(),
        InferenceReply::Flat(candidates) => candidates,
    };
    candidates
        .into_iter()
        .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
}

impl Classifier for InferenceClassifier {
    #[instrument(level = "debug", skip_all)]
    async fn classify(&self, text: &str) -> Result<SentimentResult, SentimentError> {
        let t0 = Instant::now();
        let mut req = self
            .http
            .post(self.endpoint.clone())
            .json(&InferencePayload { inputs: text });
        if let Some(token) = &self.api_token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(
                elapsed_ms = t0.elapsed().as_millis(),
                status = status.as_u16(),
                "Inference call failed"
            );
            return Err(SentimentError::Status {
                status: status.as_u16(),
                url: self.endpoint.to_string(),
                body: truncate_for_log(&body, 300),
            });
        }

        let body = resp.text().await?;
        let reply: InferenceReply = serde_json::from_str(&body)?;
        top_candidate(reply).ok_or_else(|| {
            SentimentError::Classifier(format!(
                "no labels in reply: {}",
                truncate_for_log(&body, 300)
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::POST;
    use httpmock::MockServer;
    use serde_json::json;

    fn classifier(server: &MockServer, token: Option<&str>) -> InferenceClassifier {
        let endpoint = Url::parse(&format!("{}/models/finbert", server.base_url())).unwrap();
        InferenceClassifier::new(
            reqwest::Client::new(),
            endpoint,
            token.map(str::to_string),
        )
    }

    #[tokio::test]
    async fn test_nested_reply_picks_top_label() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/models/finbert")
                .header("authorization", "Bearer hf-token")
                .json_body(json!({ "inputs": "Company X beats estimates" }));
            then.status(200).body(
                json!([[
                    { "label": "Negative", "score": 0.03 },
                    { "label": "Positive", "score": 0.92 },
                    { "label": "Neutral", "score": 0.05 }
                ]])
                .to_string(),
            );
        });

        let result = classifier(&server, Some("hf-token"))
            .classify("Company X beats estimates")
            .await
            .unwrap();

        mock.assert();
        assert_eq!(result.label, "Positive");
        assert_eq!(result.confidence, 0.92);
    }

    #[tokio::test]
    async fn test_flat_reply_is_accepted() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/models/finbert");
            then.status(200).body(
                json!([
                    { "label": "Negative", "score": 0.80 },
                    { "label": "Positive", "score": 0.20 }
                ])
                .to_string(),
            );
        });

        let result = classifier(&server, None).classify("Recall widens").await.unwrap();
        assert_eq!(result.label, "Negative");
        assert_eq!(result.confidence, 0.80);
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/models/finbert");
            then.status(503)
                .body(r#"{"error":"Model ProsusAI/finbert is currently loading"}"#);
        });

        let err = classifier(&server, None).classify("headline").await.unwrap_err();
        match err {
            SentimentError::Status { status, body, .. } => {
                assert_eq!(status, 503);
                assert!(body.contains("loading"));
            }
            other => panic!("expected Status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_reply_is_classifier_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/models/finbert");
            then.status(200).body("[[]]");
        });

        let err = classifier(&server, None).classify("headline").await.unwrap_err();
        assert!(matches!(err, SentimentError::Classifier(_)));
    }

    #[test]
    fn test_debug_hides_token() {
        let endpoint = Url::parse("http://localhost/models/finbert").unwrap();
        let c = InferenceClassifier::new(reqwest::Client::new(), endpoint, Some("secret".into()));
        let rendered = format!("{c:?}");
        assert!(!rendered.contains("secret"));
    }
}
