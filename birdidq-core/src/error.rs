// birdidq-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BirdiError {
    // --- DOMAIN ERRORS (request validation, upstream, execution) ---
    #[error(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE ERRORS (IO, databases, parsing) ---
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- GENERIC / APPLICATION ERRORS ---
    #[error("Internal Error: {0}")]
    InternalError(String),

    #[error("Unsafe path traversal detected: {0}")]
    UnsafePath(String),
}

impl BirdiError {
    /// Guidance shown under the error message by the CLI, when the error carries one.
    pub fn help(&self) -> Option<String> {
        use miette::Diagnostic;
        match self {
            BirdiError::Domain(e) => e.help().map(|h| h.to_string()),
            BirdiError::Infrastructure(e) => e.help().map(|h| h.to_string()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BirdiError {
    fn from(err: std::io::Error) -> Self {
        BirdiError::Infrastructure(InfrastructureError::Io(err))
    }
}
