// birdidq-core/src/infrastructure/adapters/mod.rs

pub mod filesystem;
pub mod json_store;
pub mod ollama;
pub mod oracle;
pub mod postgres;

pub use filesystem::{FileCatalog, FileDataset};
pub use json_store::JsonSuiteStore;
pub use ollama::OllamaGenerator;
pub use oracle::{OracleCatalog, OracleDataset};
pub use postgres::{PostgresCatalog, PostgresDataset};
