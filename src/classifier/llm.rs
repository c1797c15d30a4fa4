//! LLM classifier backend.
//!
//! Wraps `awful_aj::api::ask` with a chat template that instructs an
//! OpenAI-compatible model to reply with a single JSON object:
//!
//! ```json
//! {"label": "Positive", "score": 0.92}
//! ```
//!
//! The template and the `awful_aj` config (`config.yaml` in its config
//! directory) are loaded once, when the backend is built. Replies may wrap
//! the object in prose or code fences; the first `{ ... }` span is parsed.

use super::Classifier;
use crate::error::SentimentError;
use crate::models::SentimentResult;
use crate::utils::{looks_truncated, truncate_for_log};
use awful_aj::api::ask;
use awful_aj::{config, config::AwfulJadeConfig, config_dir, template, template::ChatTemplate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::time::Instant;
use tracing::{info, instrument, warn};

static JSON_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("JSON object pattern compiles"));

/// Classifier backed by an LLM chat template.
#[derive(Debug)]
pub struct LlmClassifier {
    config: AwfulJadeConfig,
    template: ChatTemplate,
}

impl LlmClassifier {
    /// Load the named chat template and the `awful_aj` configuration.
    #[instrument(level = "info")]
    pub async fn load(template_name: &str) -> Result<Self, Box<dyn Error>> {
        let template = template::load_template(template_name).await?;
        info!(template_name, "Loaded template");
        let conf_file = config_dir()?.join("config.yaml");
        let config_path = conf_file.to_str().ok_or("Not a valid config filename")?;
        let config = config::load_config(config_path)?;
        info!(config_path, "Loaded configuration");
        Ok(Self { config, template })
    }
}

/// Extract and decode the JSON object in an LLM reply.
fn parse_reply(reply: &str) -> Result<SentimentResult, SentimentError> {
    let candidate = match JSON_OBJECT.find(reply) {
        Some(m) => m.as_str(),
        // An unterminated object still starts at the first brace
        None => reply.find('{').map_or(reply.trim(), |i| &reply[i..]),
    };

    serde_json::from_str::<SentimentResult>(candidate).map_err(|e| {
        let kind = if looks_truncated(&e) {
            "truncated"
        } else {
            "non-conforming"
        };
        SentimentError::Classifier(format!(
            "{kind} reply ({e}): {}",
            truncate_for_log(reply, 300)
        ))
    })
}

impl Classifier for LlmClassifier {
    #[instrument(level = "debug", skip_all)]
    async fn classify(&self, text: &str) -> Result<SentimentResult, SentimentError> {
        let t0 = Instant::now();
        let reply = ask(&self.config, text.to_string(), &self.template, None, None)
            .await
            .map_err(|e| {
                warn!(elapsed_ms = t0.elapsed().as_millis(), error = %e, "API call failed");
                SentimentError::Classifier(e.to_string())
            })?;
        parse_reply(&reply)
    }
}
