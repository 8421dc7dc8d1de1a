// birdidq-core/src/infrastructure/adapters/postgres.rs

use async_trait::async_trait;
use tokio_postgres::{Client, Config, NoTls};
use tracing::{debug, error, instrument};

use crate::domain::source::DataSourceSpec;
use crate::domain::table::{ColumnSchema, Table, Value};
use crate::error::BirdiError;
use crate::infrastructure::error::{DatabaseError, InfrastructureError};
use crate::ports::dataset::{DatasetCatalog, DatasetProvider};

const DEFAULT_SCHEMA: &str = "public";

const LIST_TABLES_SQL: &str = "SELECT table_name FROM information_schema.tables \
     WHERE table_schema = $1 AND table_type = 'BASE TABLE' ORDER BY table_name";

const TABLE_COLUMNS_SQL: &str = "SELECT column_name, data_type, is_nullable \
     FROM information_schema.columns \
     WHERE table_schema = $1 AND table_name = $2 ORDER BY ordinal_position";

/// Accepts SQLAlchemy-style URLs (`postgresql+psycopg2://...`) as well as plain libpq ones.
pub fn normalize_url(url: &str) -> String {
    match url.split_once("://") {
        Some((scheme, rest)) if scheme.starts_with("postgres") => {
            let base = scheme.split('+').next().unwrap_or(scheme);
            format!("{base}://{rest}")
        }
        _ => url.to_string(),
    }
}

fn quote_ident(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Opens one client for the duration of a call; the connection task ends when it drops.
async fn connect(url: &str) -> Result<Client, InfrastructureError> {
    let config: Config = normalize_url(url).parse()?;
    let (client, connection) = config.connect(NoTls).await?;
    tokio::spawn(async move {
        if let Err(err) = connection.await {
            error!(%err, "Postgres connection error");
        }
    });
    Ok(client)
}

// --- CATALOG ---

pub struct PostgresCatalog {
    url: String,
}

impl PostgresCatalog {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl DatasetCatalog for PostgresCatalog {
    async fn list_datasets(&self) -> Result<Vec<DataSourceSpec>, BirdiError> {
        let client = connect(&self.url).await?;
        let rows = client
            .query(LIST_TABLES_SQL, &[&DEFAULT_SCHEMA])
            .await
            .map_err(InfrastructureError::from)?;
        Ok(rows
            .iter()
            .map(|row| DataSourceSpec::Postgres {
                schema: None,
                table: row.get(0),
            })
            .collect())
    }
}

// --- DATASET ---

pub struct PostgresDataset {
    source: DataSourceSpec,
    url: String,
    schema: String,
    table: String,
}

impl PostgresDataset {
    pub fn new(url: impl Into<String>, schema: Option<&str>, table: &str) -> Self {
        Self {
            source: DataSourceSpec::Postgres {
                schema: schema.map(str::to_string),
                table: table.to_string(),
            },
            url: url.into(),
            schema: schema.unwrap_or(DEFAULT_SCHEMA).to_string(),
            table: table.to_string(),
        }
    }

    async fn fetch_columns(&self, client: &Client) -> Result<Vec<ColumnSchema>, InfrastructureError> {
        let rows = client
            .query(TABLE_COLUMNS_SQL, &[&self.schema, &self.table])
            .await?;
        if rows.is_empty() {
            return Err(DatabaseError::DatasetNotFound(format!("{}.{}", self.schema, self.table)).into());
        }
        Ok(rows
            .iter()
            .map(|row| ColumnSchema {
                name: row.get(0),
                data_type: row.get(1),
                is_nullable: row.get::<_, String>(2) == "YES",
            })
            .collect())
    }

    async fn fetch(&self, limit: Option<usize>) -> Result<Table, InfrastructureError> {
        let client = connect(&self.url).await?;
        let columns = self.fetch_columns(&client).await?;

        let projection = columns
            .iter()
            .map(|c| format!("CAST({} AS TEXT)", quote_ident(&c.name)))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!(
            "SELECT {projection} FROM {}.{}",
            quote_ident(&self.schema),
            quote_ident(&self.table)
        );
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let rows = client.query(sql.as_str(), &[]).await?;
        let data: Vec<Vec<Value>> = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .enumerate()
                    .map(|(i, col)| Value::coerce(row.get::<_, Option<String>>(i), &col.data_type))
                    .collect()
            })
            .collect();

        debug!("Read {} row(s) from {}.{}", data.len(), self.schema, self.table);
        Ok(Table::new(&self.table, columns).with_rows(data))
    }
}

#[async_trait]
impl DatasetProvider for PostgresDataset {
    fn source(&self) -> &DataSourceSpec {
        &self.source
    }

    async fn list_columns(&self) -> Result<Vec<ColumnSchema>, BirdiError> {
        let client = connect(&self.url).await?;
        Ok(self.fetch_columns(&client).await?)
    }

    #[instrument(skip(self), fields(table = %self.table))]
    async fn read_all(&self) -> Result<Table, BirdiError> {
        Ok(self.fetch(None).await?)
    }

    async fn preview(&self, limit: usize) -> Result<Table, BirdiError> {
        Ok(self.fetch(Some(limit)).await?)
    }
}
