// birdidq-core/src/ports/dataset.rs

use async_trait::async_trait;

use crate::domain::source::DataSourceSpec;
use crate::error::BirdiError;

pub use crate::domain::table::{ColumnSchema, Table};

/// Read access to one dataset (a CSV file, a PostgreSQL table, an Oracle table).
#[async_trait]
pub trait DatasetProvider: Send + Sync {
    fn source(&self) -> &DataSourceSpec;

    async fn list_columns(&self) -> Result<Vec<ColumnSchema>, BirdiError>;

    async fn read_all(&self) -> Result<Table, BirdiError>;

    async fn preview(&self, limit: usize) -> Result<Table, BirdiError> {
        Ok(self.read_all().await?.head(limit))
    }

    async fn column_names(&self) -> Result<Vec<String>, BirdiError> {
        Ok(self
            .list_columns()
            .await?
            .into_iter()
            .map(|c| c.name)
            .collect())
    }
}

/// Lists the datasets one kind of source can offer.
#[async_trait]
pub trait DatasetCatalog: Send + Sync {
    async fn list_datasets(&self) -> Result<Vec<DataSourceSpec>, BirdiError>;
}
