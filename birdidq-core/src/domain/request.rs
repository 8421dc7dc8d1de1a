// birdidq-core/src/domain/request.rs

use crate::domain::error::DomainError;

/// A natural-language check request plus the columns it may reference.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckRequest {
    text: String,
    columns: Vec<String>,
}

impl CheckRequest {
    /// Rejects blank text. Columns are attached afterwards, once the dataset has been read.
    pub fn new(text: impl Into<String>) -> Result<Self, DomainError> {
        let text = text.into().trim().to_string();
        if text.is_empty() {
            return Err(DomainError::InvalidInput(
                "the check description is empty".to_string(),
            ));
        }
        Ok(Self {
            text,
            columns: Vec::new(),
        })
    }

    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = columns;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}
