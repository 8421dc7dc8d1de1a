// birdidq-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    #[diagnostic(
        code(birdidq::domain::invalid_input),
        help("Describe the check in plain words, e.g. 'amount should be greater than 0'.")
    )]
    InvalidInput(String),

    #[error("Model endpoint unavailable after {attempts} attempt(s): {detail}")]
    #[diagnostic(
        code(birdidq::domain::upstream),
        help("Retry in a moment, or check OLLAMA_CLOUD_BASE_URL / OLLAMA_API_KEY.")
    )]
    UpstreamUnavailable { attempts: usize, detail: String },

    #[error("No executable rule statements ({attempted} attempted)")]
    #[diagnostic(
        code(birdidq::domain::no_statements),
        help("Rephrase your request and check that column names match the dataset exactly.")
    )]
    NoExecutableStatements {
        attempted: usize,
        reasons: Vec<String>,
    },

    #[error("Unknown datasource '{0}'")]
    #[diagnostic(
        code(birdidq::domain::source),
        help("Use 'file:<name>', 'postgres:<[schema.]table>' or 'oracle:<table>'.")
    )]
    UnknownSource(String),

    #[error("Suite '{0}' not found")]
    #[diagnostic(code(birdidq::domain::suite_not_found))]
    SuiteNotFound(String),

    #[error("Suite store error: {0}")]
    #[diagnostic(code(birdidq::domain::store))]
    StoreError(String),
}
