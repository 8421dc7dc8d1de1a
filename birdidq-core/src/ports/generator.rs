// birdidq-core/src/ports/generator.rs

use async_trait::async_trait;
use thiserror::Error;

/// Failure of one generation call, classified for the retry loop.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    /// Worth retrying: gateway errors, timeouts, dropped connections.
    #[error("transient model error: {0}")]
    Transient(String),

    #[error("model request failed: {0}")]
    Fatal(String),
}

impl ModelError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ModelError::Transient(_))
    }
}

/// Remote text generation: one prompt in, one completion out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;

    fn model_name(&self) -> &str;
}
