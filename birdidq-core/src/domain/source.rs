// birdidq-core/src/domain/source.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::DomainError;

/// Where a dataset lives: `file:<name>`, `postgres:<[schema.]table>` or `oracle:<table>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataSourceSpec {
    File { name: String },
    Postgres { schema: Option<String>, table: String },
    Oracle { table: String },
}

impl DataSourceSpec {
    /// Name used for suites, checkpoints and docs.
    pub fn asset_name(&self) -> &str {
        match self {
            DataSourceSpec::File { name } => name,
            DataSourceSpec::Postgres { table, .. } | DataSourceSpec::Oracle { table } => table,
        }
    }

    /// Label of the engine that evaluates the data, shown in rule notes.
    pub fn engine(&self) -> &'static str {
        match self {
            DataSourceSpec::File { .. } => "DuckDB",
            DataSourceSpec::Postgres { .. } => "SQL (PostgreSQL)",
            DataSourceSpec::Oracle { .. } => "SQL (Oracle)",
        }
    }
}

impl FromStr for DataSourceSpec {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || DomainError::UnknownSource(s.to_string());
        let (kind, target) = s.trim().split_once(':').ok_or_else(unknown)?;
        let target = target.trim();
        if target.is_empty() {
            return Err(unknown());
        }

        match kind.trim().to_ascii_lowercase().as_str() {
            "file" | "csv" | "fs" | "filesystem" => Ok(DataSourceSpec::File {
                name: target.to_string(),
            }),
            "postgres" | "postgresql" | "pg" => match target.split_once('.') {
                Some((schema, table)) if !schema.is_empty() && !table.is_empty() => {
                    Ok(DataSourceSpec::Postgres {
                        schema: Some(schema.to_string()),
                        table: table.to_string(),
                    })
                }
                Some(_) => Err(unknown()),
                None => Ok(DataSourceSpec::Postgres {
                    schema: None,
                    table: target.to_string(),
                }),
            },
            "oracle" | "ora" => Ok(DataSourceSpec::Oracle {
                table: target.to_string(),
            }),
            _ => Err(unknown()),
        }
    }
}

impl fmt::Display for DataSourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceSpec::File { name } => write!(f, "file:{name}"),
            DataSourceSpec::Postgres {
                schema: Some(schema),
                table,
            } => write!(f, "postgres:{schema}.{table}"),
            DataSourceSpec::Postgres { schema: None, table } => write!(f, "postgres:{table}"),
            DataSourceSpec::Oracle { table } => write!(f, "oracle:{table}"),
        }
    }
}
