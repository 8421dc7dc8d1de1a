// birdidq-core/src/infrastructure/adapters/ollama.rs

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::infrastructure::config::ModelConfig;
use crate::ports::generator::{ModelError, TextGenerator};

/// Client for the Ollama `/api/generate` endpoint (hosted or local).
#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    base_url: String,
    api_key: Option<String>,
    model: String,
    options: GenerateOptions,
    timeout: Duration,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: &'a GenerateOptions,
}

#[derive(Debug, Clone, Serialize)]
struct GenerateOptions {
    temperature: f32,
    top_p: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    eval_count: Option<usize>,
}

impl OllamaGenerator {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            options: GenerateOptions {
                temperature: config.temperature,
                top_p: config.top_p,
                num_predict: config.max_tokens,
            },
            timeout: Duration::from_secs(config.timeout_secs),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Gateway errors, throttling and request timeouts are worth another attempt.
fn is_transient_status(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: &self.options,
        };
        debug!("Sending request to {}", url);

        let mut builder = self
            .client
            .post(&url)
            .json(&request)
            .timeout(self.timeout);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ModelError::Transient(format!("timed out after {}s", self.timeout.as_secs()))
            } else if e.is_connect() {
                ModelError::Transient(format!("cannot reach {}: {e}", self.base_url))
            } else if e.is_builder() {
                ModelError::Fatal(format!("invalid request: {e}"))
            } else {
                ModelError::Transient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = format!("HTTP {status}: {}", body.trim());
            return Err(if is_transient_status(status) {
                ModelError::Transient(detail)
            } else {
                ModelError::Fatal(detail)
            });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Transient(format!("malformed response body: {e}")))?;
        debug!(
            "Completion received ({} tokens)",
            body.eval_count.unwrap_or(0)
        );
        Ok(body.response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
