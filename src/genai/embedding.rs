//! Embedding client for the hosted Gemini embeddings API.
//!
//! # Retry Strategy
//!
//! Rate limits and transient failures are retried with exponential backoff:
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)
//!
//! Once `max_retries` attempts are exhausted the call fails with
//! [`Error::RateLimitExceeded`]; callers decide whether that aborts their
//! pipeline or drops the item.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::GenAiConfig;
use crate::error::{Error, Result};

/// Embedding role. The hosted API encodes documents and queries differently,
/// so the caller must say which side of the retrieval it is embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedTask {
    Document,
    Query,
}

impl EmbedTask {
    fn wire_name(self) -> &'static str {
        match self {
            EmbedTask::Document => "RETRIEVAL_DOCUMENT",
            EmbedTask::Query => "RETRIEVAL_QUERY",
        }
    }
}

#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Maps text to a fixed-length vector.
    async fn embed(&self, text: &str, task: EmbedTask) -> Result<Vec<f32>>;
}

pub struct GeminiEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    max_retries: u32,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

impl GeminiEmbedder {
    pub fn new(config: &GenAiConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(Error::Config("embedding api key not set".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.embedding_model.clone(),
            api_key: config.api_key.clone(),
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl EmbeddingClient for GeminiEmbedder {
    async fn embed(&self, text: &str, task: EmbedTask) -> Result<Vec<f32>> {
        // The upstream embedder treats newlines as separators.
        let clean_text = text.replace('\n', " ");

        let url = format!(
            "{}/v1beta/models/{}:embedContent",
            self.base_url, self.model
        );
        let body = json!({
            "model": format!("models/{}", self.model),
            "content": { "parts": [{ "text": clean_text }] },
            "taskType": task.wire_name(),
        });

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s, 8s, ...
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tracing::warn!("embedding attempt {attempt} failed, retrying in {delay:?}");
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let parsed: EmbedResponse = response.json().await.map_err(|e| {
                            Error::Upstream(format!("invalid embedding response: {e}"))
                        })?;
                        return Ok(parsed.embedding.values);
                    }

                    // Rate limited or server error, retry
                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        last_err = Some(format!("embedding api error {status}: {body_text}"));
                        continue;
                    }

                    // Client error (not 429), don't retry
                    let body_text = response.text().await.unwrap_or_default();
                    return Err(Error::Upstream(format!(
                        "embedding api error {status}: {body_text}"
                    )));
                }
                Err(e) => {
                    last_err = Some(e.to_string());
                    continue;
                }
            }
        }

        tracing::error!(
            "embedding call exhausted retries: {}",
            last_err.as_deref().unwrap_or("unknown")
        );
        Err(Error::RateLimitExceeded(self.max_retries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_wire_names() {
        assert_eq!(EmbedTask::Document.wire_name(), "RETRIEVAL_DOCUMENT");
        assert_eq!(EmbedTask::Query.wire_name(), "RETRIEVAL_QUERY");
    }

    #[test]
    fn test_embed_response_parses() {
        let raw = r#"{ "embedding": { "values": [0.1, -0.2, 0.3] } }"#;
        let parsed: EmbedResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.embedding.values.len(), 3);
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let config = GenAiConfig::default();
        assert!(matches!(
            GeminiEmbedder::new(&config),
            Err(Error::Config(_))
        ));
    }
}
