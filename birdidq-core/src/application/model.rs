// birdidq-core/src/application/model.rs

use std::sync::Arc;
use tracing::{info, instrument};

use crate::application::retry::{RetryDisposition, RetryPolicy};
use crate::domain::error::DomainError;
use crate::ports::generator::{ModelError, TextGenerator};

const PING_PROMPT: &str = "Hello, are you working?";

#[derive(Debug, Clone, PartialEq)]
pub struct PingReport {
    pub model: String,
    pub reply: String,
}

/// Text generation with retry around transient endpoint failures.
#[derive(Clone)]
pub struct ModelClient {
    generator: Arc<dyn TextGenerator>,
    retry: RetryPolicy,
}

impl ModelClient {
    pub fn new(generator: Arc<dyn TextGenerator>, retry: RetryPolicy) -> Self {
        Self { generator, retry }
    }

    pub fn model_name(&self) -> &str {
        self.generator.model_name()
    }

    #[instrument(skip(self, prompt), fields(model = %self.generator.model_name()))]
    pub async fn generate(&self, prompt: &str) -> Result<String, DomainError> {
        let generator = self.generator.clone();
        let text = self
            .retry
            .run(
                || {
                    let generator = generator.clone();
                    async move { generator.generate(prompt).await }
                },
                classify,
            )
            .await
            .map_err(|e| DomainError::UpstreamUnavailable {
                attempts: e.attempts(),
                detail: e.into_inner().to_string(),
            })?;
        info!("Model returned {} chars", text.len());
        Ok(text)
    }

    /// One short generation, to check endpoint, credential and model in one go.
    pub async fn ping(&self) -> Result<PingReport, DomainError> {
        let reply = self.generate(PING_PROMPT).await?;
        Ok(PingReport {
            model: self.model_name().to_string(),
            reply: reply.trim().to_string(),
        })
    }
}

fn classify(error: &ModelError) -> RetryDisposition {
    if error.is_transient() {
        RetryDisposition::Retry
    } else {
        RetryDisposition::Stop
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replays scripted replies and records every prompt it receives.
    pub(crate) struct ScriptedGenerator {
        pub replies: Mutex<VecDeque<Result<String, ModelError>>>,
        pub prompts: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedGenerator {
        pub(crate) fn new(replies: Vec<Result<String, ModelError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                prompts: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ModelError::Fatal("script exhausted".into())))
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    fn bad_gateway() -> Result<String, ModelError> {
        Err(ModelError::Transient("HTTP 502 Bad Gateway: upstream error".into()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_bad_gateways_exhaust_retries() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            bad_gateway(),
            bad_gateway(),
            bad_gateway(),
        ]));
        let client = ModelClient::new(
            generator.clone(),
            RetryPolicy::new(3, Duration::from_secs(2), Duration::from_secs(60)),
        );

        let err = client.generate("prompt").await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::UpstreamUnavailable { attempts: 3, .. }
        ));
        assert_eq!(generator.prompts.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_fatal_error_is_not_retried() {
        let generator = Arc::new(ScriptedGenerator::new(vec![Err(ModelError::Fatal(
            "HTTP 401 Unauthorized".into(),
        ))]));
        let client = ModelClient::new(generator.clone(), RetryPolicy::default());

        let err = client.generate("prompt").await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::UpstreamUnavailable { attempts: 1, .. }
        ));
        assert_eq!(generator.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ping_after_one_retry() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            bad_gateway(),
            Ok(" Yes, I am. \n".into()),
        ]));
        let client = ModelClient::new(generator, RetryPolicy::default());
        let report = client.ping().await.unwrap();
        assert_eq!(report.model, "scripted");
        assert_eq!(report.reply, "Yes, I am.");
    }
}
