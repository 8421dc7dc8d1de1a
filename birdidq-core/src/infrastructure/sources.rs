// birdidq-core/src/infrastructure/sources.rs

// Maps a datasource string to the adapter that serves it.

use crate::domain::source::DataSourceSpec;
use crate::error::BirdiError;
use crate::infrastructure::adapters::{
    FileCatalog, FileDataset, OracleCatalog, OracleDataset, PostgresCatalog, PostgresDataset,
};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::dataset::{DatasetCatalog, DatasetProvider};

/// Which family of sources to enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    File,
    Postgres,
    Oracle,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [SourceKind::File, SourceKind::Postgres, SourceKind::Oracle];

    pub fn label(self) -> &'static str {
        match self {
            SourceKind::File => "Local file system",
            SourceKind::Postgres => "PostgreSQL",
            SourceKind::Oracle => "Oracle",
        }
    }
}

fn connection(value: &Option<String>, name: &str) -> Result<String, InfrastructureError> {
    value
        .clone()
        .ok_or_else(|| InfrastructureError::ConnectionMissing(name.to_string()))
}

pub fn open_dataset(
    spec: &DataSourceSpec,
    config: &AppConfig,
) -> Result<Box<dyn DatasetProvider>, BirdiError> {
    Ok(match spec {
        DataSourceSpec::File { name } => Box::new(FileDataset::locate(&config.data_dir, name)?),
        DataSourceSpec::Postgres { schema, table } => Box::new(PostgresDataset::new(
            connection(&config.connections.postgres, "PostgreSQL")?,
            schema.as_deref(),
            table,
        )),
        DataSourceSpec::Oracle { table } => Box::new(OracleDataset::new(
            &connection(&config.connections.oracle, "Oracle")?,
            table,
        )),
    })
}

pub fn catalog(kind: SourceKind, config: &AppConfig) -> Result<Box<dyn DatasetCatalog>, BirdiError> {
    Ok(match kind {
        SourceKind::File => Box::new(FileCatalog::new(&config.data_dir)),
        SourceKind::Postgres => Box::new(PostgresCatalog::new(connection(
            &config.connections.postgres,
            "PostgreSQL",
        )?)),
        SourceKind::Oracle => Box::new(OracleCatalog::new(&connection(
            &config.connections.oracle,
            "Oracle",
        )?)),
    })
}
