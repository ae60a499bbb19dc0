/// LLM Client — the single point of entry for calls to the local model server.
///
/// All plan generation goes through `PlanGenerator`; `LlmClient` is the Ollama
/// `/api/generate` implementation. Handlers only ever see `Arc<dyn PlanGenerator>`.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("The request to the model server timed out after {secs}s. The model might be taking too long to respond.")]
    Timeout { secs: u64 },

    #[error("Error connecting to the model server at {url}: {source}. Is Ollama running?")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Anything that can turn a fully assembled prompt into plan text.
///
/// Carried in `AppState` as `Arc<dyn PlanGenerator>` so handlers can be tested
/// without a model server.
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, timeout: Duration) -> Result<String, LlmError>;

    /// Model identifier, for logs and responses.
    fn model(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    eval_count: Option<u64>,
    #[serde(default)]
    total_duration: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct OllamaError {
    error: String,
}

/// Ollama `/api/generate` client. Non-streaming, one attempt per call.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    url: String,
    model: String,
}

impl LlmClient {
    pub fn new(url: String, model: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().build()?,
            url,
            model,
        })
    }

    fn classify(&self, error: reqwest::Error, timeout: Duration) -> LlmError {
        if error.is_timeout() {
            LlmError::Timeout {
                secs: timeout.as_secs(),
            }
        } else if error.is_connect() {
            LlmError::Connection {
                url: self.url.clone(),
                source: error,
            }
        } else {
            LlmError::Http(error)
        }
    }
}

#[async_trait]
impl PlanGenerator for LlmClient {
    async fn generate(&self, prompt: &str, timeout: Duration) -> Result<String, LlmError> {
        let request_body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(&self.url)
            .timeout(timeout)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| self.classify(e, timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.classify(e, timeout))?;

        if !status.is_success() {
            let message = serde_json::from_str::<OllamaError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            warn!(status = status.as_u16(), %message, "Model server returned an error");
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)?;

        debug!(
            model = %self.model,
            eval_count = ?parsed.eval_count,
            total_duration_ns = ?parsed.total_duration,
            "LLM call succeeded"
        );

        let text = strip_markdown_fences(&parsed.response);
        if text.is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(text.to_string())
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Strips a ```markdown ... ``` (or bare ``` ... ```) wrapper some models put around
/// the whole answer. Fences inside the text are left alone.
pub fn strip_markdown_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return text;
    };
    // Drop the info string (`markdown`, `md`, ...) on the opening fence line.
    match inner.split_once('\n') {
        Some((info, body)) if !info.trim().contains(' ') => body.trim(),
        _ => inner.trim(),
    }
}
