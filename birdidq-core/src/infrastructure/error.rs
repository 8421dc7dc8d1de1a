// birdidq-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DatabaseError {
    #[error("DuckDB Engine Error: {0}")]
    #[diagnostic(
        code(birdidq::infra::database::duckdb),
        help("Check that the file is a readable CSV or Parquet file.")
    )]
    DuckDB(#[from] duckdb::Error),

    #[error("PostgreSQL Error: {0}")]
    #[diagnostic(
        code(birdidq::infra::database::postgres),
        help("Verify POSTGRES_CONNECTION_STRING and that the database is reachable.")
    )]
    Postgres(#[from] tokio_postgres::Error),

    #[cfg(feature = "oracle")]
    #[error("Oracle Error: {0}")]
    #[diagnostic(
        code(birdidq::infra::database::oracle),
        help("Verify ORACLE_CONNECTION_STRING and that the Oracle instance is running.")
    )]
    Oracle(#[from] oracle::Error),

    #[error("Dataset '{0}' not found")]
    #[diagnostic(code(birdidq::infra::database::not_found))]
    DatasetNotFound(String),

    #[error("{0}")]
    #[diagnostic(code(birdidq::infra::database::unsupported))]
    Unsupported(String),
}

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- DATABASE (Abstracted) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Database(#[from] DatabaseError),

    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(birdidq::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- CONFIG / YAML ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(birdidq::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON Error: {0}")]
    #[diagnostic(code(birdidq::infra::json))]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    #[diagnostic(code(birdidq::infra::config))]
    ConfigError(String),

    #[error("Invalid configuration: {0}")]
    #[diagnostic(
        code(birdidq::infra::config_invalid),
        help("Fix the listed fields in birdidq.yaml or the matching environment variables.")
    )]
    ConfigInvalid(#[from] validator::ValidationErrors),

    #[error("Connection string for {0} is not set")]
    #[diagnostic(
        code(birdidq::infra::connection_missing),
        help("Set it in birdidq.yaml under 'connections' or through the environment.")
    )]
    ConnectionMissing(String),

    // --- TEMPLATING ---
    #[error("Template Rendering Error: {0}")]
    #[diagnostic(code(birdidq::infra::template))]
    TemplateError(#[from] minijinja::Error),
}

// Shortcuts for `?` on driver calls
impl From<duckdb::Error> for InfrastructureError {
    fn from(err: duckdb::Error) -> Self {
        InfrastructureError::Database(DatabaseError::DuckDB(err))
    }
}

impl From<tokio_postgres::Error> for InfrastructureError {
    fn from(err: tokio_postgres::Error) -> Self {
        InfrastructureError::Database(DatabaseError::Postgres(err))
    }
}

#[cfg(feature = "oracle")]
impl From<oracle::Error> for InfrastructureError {
    fn from(err: oracle::Error) -> Self {
        InfrastructureError::Database(DatabaseError::Oracle(err))
    }
}
