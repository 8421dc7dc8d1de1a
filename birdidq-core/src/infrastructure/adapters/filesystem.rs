// birdidq-core/src/infrastructure/adapters/filesystem.rs

use async_trait::async_trait;
use duckdb::Connection;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::domain::source::DataSourceSpec;
use crate::domain::table::{ColumnSchema, Table, Value};
use crate::error::BirdiError;
use crate::infrastructure::error::{DatabaseError, InfrastructureError};
use crate::ports::dataset::{DatasetCatalog, DatasetProvider};

const EXTENSIONS: [&str; 4] = ["csv", "json", "jsonl", "parquet"];
/// Name of the DuckDB view every file is exposed through.
const VIEW: &str = "dataset";

/// Dataset name shown to users for a data file: `orders.csv` -> `Orders`.
pub fn dataset_name(file_stem: &str) -> String {
    let mut chars = file_stem.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn is_data_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn data_files(data_dir: &Path) -> Vec<PathBuf> {
    if !data_dir.exists() {
        return Vec::new();
    }
    let mut files: Vec<PathBuf> = WalkDir::new(data_dir)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && is_data_file(p))
        .collect();
    files.sort();
    files
}

fn sql_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn quote_ident(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

// --- CATALOG ---

/// Lists the CSV and Parquet files directly under the data directory.
pub struct FileCatalog {
    data_dir: PathBuf,
}

impl FileCatalog {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }
}

#[async_trait]
impl DatasetCatalog for FileCatalog {
    async fn list_datasets(&self) -> Result<Vec<DataSourceSpec>, BirdiError> {
        Ok(data_files(&self.data_dir)
            .iter()
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()))
            .map(|stem| DataSourceSpec::File {
                name: dataset_name(stem),
            })
            .collect())
    }
}

// --- DATASET ---

/// One data file, read through an in-memory DuckDB connection opened per call.
pub struct FileDataset {
    source: DataSourceSpec,
    path: PathBuf,
}

impl FileDataset {
    /// Finds the file behind `name`: the derived dataset name, the stem or the full file name.
    /// Whichever alias was given, the source carries the derived dataset name.
    pub fn locate(data_dir: &Path, name: &str) -> Result<Self, InfrastructureError> {
        let (path, canonical) = data_files(data_dir)
            .into_iter()
            .find_map(|p| {
                let stem = p.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
                let file = p.file_name().and_then(|s| s.to_str()).unwrap_or_default();
                let derived = dataset_name(stem);
                (derived == name || stem == name || file == name).then(|| (p.clone(), derived))
            })
            .ok_or_else(|| DatabaseError::DatasetNotFound(format!("{name} (in {})", data_dir.display())))?;

        Ok(Self {
            source: DataSourceSpec::File { name: canonical },
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn reader(&self) -> String {
        let path = sql_literal(&self.path.to_string_lossy());
        let ext = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("parquet") => format!("read_parquet({path})"),
            Some("json" | "jsonl") => format!("read_json_auto({path})"),
            _ => format!("read_csv_auto({path})"),
        }
    }

    fn open(&self) -> Result<Connection, InfrastructureError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(&format!(
            "CREATE VIEW {VIEW} AS SELECT * FROM {}",
            self.reader()
        ))?;
        Ok(conn)
    }

    fn fetch_columns(conn: &Connection) -> Result<Vec<ColumnSchema>, InfrastructureError> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info('{VIEW}')"))?;
        let rows = stmt.query_map([], |row| {
            Ok(ColumnSchema {
                name: row.get("name")?,
                data_type: row.get("type")?,
                is_nullable: !row.get::<_, bool>("notnull")?,
            })
        })?;

        let mut columns = Vec::new();
        for row in rows {
            columns.push(row?);
        }
        Ok(columns)
    }

    fn fetch(&self, limit: Option<usize>) -> Result<Table, InfrastructureError> {
        let conn = self.open()?;
        let columns = Self::fetch_columns(&conn)?;
        if columns.is_empty() {
            return Ok(Table::new(self.source.asset_name(), columns));
        }

        // Everything comes back as text, typed afterwards from the declared column type
        let projection = columns
            .iter()
            .map(|c| format!("CAST({} AS VARCHAR)", quote_ident(&c.name)))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!("SELECT {projection} FROM {VIEW}");
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut data = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(columns.len());
            for (i, col) in columns.iter().enumerate() {
                let raw: Option<String> = row.get(i)?;
                values.push(Value::coerce(raw, &col.data_type));
            }
            data.push(values);
        }

        debug!("Read {} row(s) from {}", data.len(), self.path.display());
        Ok(Table::new(self.source.asset_name(), columns).with_rows(data))
    }
}

#[async_trait]
impl DatasetProvider for FileDataset {
    fn source(&self) -> &DataSourceSpec {
        &self.source
    }

    async fn list_columns(&self) -> Result<Vec<ColumnSchema>, BirdiError> {
        let conn = self.open()?;
        Ok(Self::fetch_columns(&conn)?)
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn read_all(&self) -> Result<Table, BirdiError> {
        Ok(self.fetch(None)?)
    }

    async fn preview(&self, limit: usize) -> Result<Table, BirdiError> {
        Ok(self.fetch(Some(limit))?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    fn data_dir() -> Result<tempfile::TempDir> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("orders.csv"),
            "id,amount,status\n1,10.5,paid\n2,,open\n3,7.25,paid\n",
        )?;
        fs::write(dir.path().join("CUSTOMERS.csv"), "id,name\n1,Ada\n")?;
        fs::write(dir.path().join("notes.txt"), "ignored")?;
        Ok(dir)
    }

    #[test]
    fn test_dataset_name_capitalizes() {
        assert_eq!(dataset_name("orders"), "Orders");
        assert_eq!(dataset_name("CUSTOMERS"), "Customers");
        assert_eq!(dataset_name(""), "");
    }

    #[tokio::test]
    async fn test_catalog_lists_data_files() -> Result<()> {
        let dir = data_dir()?;
        let names: Vec<String> = FileCatalog::new(dir.path())
            .list_datasets()
            .await?
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["file:Customers", "file:Orders"]);

        let missing = FileCatalog::new(dir.path().join("nope")).list_datasets().await?;
        assert!(missing.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_read_csv_with_types_and_nulls() -> Result<()> {
        let dir = data_dir()?;
        let dataset = FileDataset::locate(dir.path(), "Orders")?;

        let columns = dataset.column_names().await?;
        assert_eq!(columns, vec!["id", "amount", "status"]);

        let table = dataset.read_all().await?;
        assert_eq!(table.name, "Orders");
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.rows[0][0], Value::Int(1));
        assert_eq!(table.rows[0][1], Value::Float(10.5));
        assert_eq!(table.rows[1][1], Value::Null);
        assert_eq!(table.rows[2][2], Value::Text("paid".into()));

        let preview = dataset.preview(2).await?;
        assert_eq!(preview.row_count(), 2);
        Ok(())
    }

    #[test]
    fn test_unknown_file_is_not_found() -> Result<()> {
        let dir = data_dir()?;
        let err = FileDataset::locate(dir.path(), "Invoices").err().unwrap();
        assert!(matches!(
            err,
            InfrastructureError::Database(DatabaseError::DatasetNotFound(_))
        ));
        Ok(())
    }

    #[test]
    fn test_aliases_resolve_to_one_dataset_name() -> Result<()> {
        let dir = data_dir()?;
        for alias in ["Orders", "orders", "orders.csv"] {
            let dataset = FileDataset::locate(dir.path(), alias)?;
            assert_eq!(dataset.source().asset_name(), "Orders", "alias {alias}");
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_read_json_records() -> Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("events.json"),
            r#"[{"id": 1, "kind": "click"}, {"id": 2, "kind": null}]"#,
        )?;

        let names = FileCatalog::new(dir.path()).list_datasets().await?;
        assert_eq!(names, vec![DataSourceSpec::File { name: "Events".into() }]);

        let table = FileDataset::locate(dir.path(), "events.json")?.read_all().await?;
        assert_eq!(table.column_names(), vec!["id", "kind"]);
        assert_eq!(table.rows[0][0], Value::Int(1));
        assert_eq!(table.rows[0][1], Value::Text("click".into()));
        assert_eq!(table.rows[1][1], Value::Null);
        Ok(())
    }
}
