// birdidq-core/src/infrastructure/adapters/json_store.rs

use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::domain::error::DomainError;
use crate::domain::ports::SuiteStore;
use crate::domain::run::ValidationRun;
use crate::domain::suite::ValidationSuite;
use crate::infrastructure::fs::write_json;

/// Suites as `<root>/suites/<name>.json`, runs as `<root>/runs/<suite>/<run_id>.json`.
pub struct JsonSuiteStore {
    root: PathBuf,
}

fn store_err(e: impl std::fmt::Display) -> DomainError {
    DomainError::StoreError(e.to_string())
}

/// Names become file names: no separators, no parent references.
fn checked(name: &str) -> Result<&str, DomainError> {
    if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
        return Err(DomainError::StoreError(format!("'{name}' is not a valid suite name")));
    }
    Ok(name)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DomainError> {
    let content = fs::read_to_string(path).map_err(store_err)?;
    serde_json::from_str(&content).map_err(|e| store_err(format!("{}: {e}", path.display())))
}

fn json_files(dir: &Path) -> Result<Vec<PathBuf>, DomainError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(store_err)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    Ok(files)
}

impl JsonSuiteStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn suites_dir(&self) -> PathBuf {
        self.root.join("suites")
    }

    fn runs_dir(&self) -> PathBuf {
        self.root.join("runs")
    }

    fn suite_path(&self, name: &str) -> Result<PathBuf, DomainError> {
        Ok(self.suites_dir().join(format!("{}.json", checked(name)?)))
    }
}

impl SuiteStore for JsonSuiteStore {
    fn load_suite(&self, name: &str) -> Result<Option<ValidationSuite>, DomainError> {
        let path = self.suite_path(name)?;
        if !path.exists() {
            return Ok(None);
        }
        read_json(&path).map(Some)
    }

    fn save_suite(&self, suite: &ValidationSuite) -> Result<(), DomainError> {
        let path = self.suite_path(&suite.name)?;
        write_json(&path, suite).map_err(store_err)?;
        debug!("Suite '{}' written to {}", suite.name, path.display());
        Ok(())
    }

    fn delete_suite(&self, name: &str) -> Result<bool, DomainError> {
        let path = self.suite_path(name)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(store_err)?;
        Ok(true)
    }

    fn list_suites(&self) -> Result<Vec<ValidationSuite>, DomainError> {
        let mut suites = Vec::new();
        for path in json_files(&self.suites_dir())? {
            match read_json(&path) {
                Ok(suite) => suites.push(suite),
                Err(e) => warn!("Skipping unreadable suite file: {e}"),
            }
        }
        Ok(suites)
    }

    fn save_run(&self, run: &ValidationRun) -> Result<(), DomainError> {
        let path = self
            .runs_dir()
            .join(checked(&run.suite_name)?)
            .join(format!("{}.json", run.run_id));
        write_json(&path, run).map_err(store_err)
    }

    fn list_runs(&self, suite: Option<&str>) -> Result<Vec<ValidationRun>, DomainError> {
        let dirs = match suite {
            Some(name) => vec![self.runs_dir().join(checked(name)?)],
            None if self.runs_dir().exists() => fs::read_dir(self.runs_dir())
                .map_err(store_err)?
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_dir())
                .collect(),
            None => Vec::new(),
        };

        let mut runs: Vec<ValidationRun> = Vec::new();
        for dir in dirs {
            for path in json_files(&dir)? {
                match read_json(&path) {
                    Ok(run) => runs.push(run),
                    Err(e) => warn!("Skipping unreadable run file: {e}"),
                }
            }
        }
        runs.sort_by(|a, b| a.run_time.cmp(&b.run_time).then_with(|| a.run_id.cmp(&b.run_id)));
        Ok(runs)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::outcome::RuleResult;
    use crate::domain::rule::Rule;
    use crate::domain::run::RuleEvaluation;
    use anyhow::Result;
    use chrono::{Duration, Utc};
    use tempfile::tempdir;

    fn suite() -> ValidationSuite {
        let mut suite = ValidationSuite::for_asset("Orders_expectation_suite", "Orders");
        suite.add_rule(Rule::parse("validator.expect_column_values_to_not_be_null(column='id')").unwrap());
        suite
    }

    fn run(suite: &ValidationSuite, minutes_ago: i64) -> ValidationRun {
        let rule = suite.rules[0].clone();
        let mut run = ValidationRun::new(
            "Orders_checkpoint",
            &suite.name,
            "Orders",
            vec![RuleEvaluation {
                rule,
                result: RuleResult::default(),
                exception_info: None,
            }],
        );
        run.run_time = Utc::now() - Duration::minutes(minutes_ago);
        run.run_id = format!("run-{minutes_ago}");
        run
    }

    #[test]
    fn test_suite_round_trip_and_delete() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonSuiteStore::new(dir.path());
        assert!(store.load_suite("Orders_expectation_suite")?.is_none());

        store.save_suite(&suite())?;
        let loaded = store.load_suite("Orders_expectation_suite")?.unwrap();
        assert_eq!(loaded, suite_with_times(&loaded));
        assert_eq!(store.list_suites()?.len(), 1);

        assert!(store.delete_suite("Orders_expectation_suite")?);
        assert!(!store.delete_suite("Orders_expectation_suite")?);
        Ok(())
    }

    // Timestamps differ between two `suite()` calls
    fn suite_with_times(loaded: &ValidationSuite) -> ValidationSuite {
        ValidationSuite {
            created_at: loaded.created_at,
            updated_at: loaded.updated_at,
            ..suite()
        }
    }

    #[test]
    fn test_get_or_create_returns_fresh_suite() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonSuiteStore::new(dir.path());
        let fresh = store.get_or_create_suite("Orders_expectation_suite", "Orders")?;
        assert!(fresh.is_empty());
        assert_eq!(fresh.data_asset.as_deref(), Some("Orders"));
        Ok(())
    }

    #[test]
    fn test_runs_are_listed_oldest_first() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonSuiteStore::new(dir.path());
        let suite = suite();
        store.save_run(&run(&suite, 1))?;
        store.save_run(&run(&suite, 30))?;

        let runs = store.list_runs(None)?;
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].run_id, "run-30");
        assert_eq!(store.list_runs(Some("Orders_expectation_suite"))?.len(), 2);
        assert!(store.list_runs(Some("Other_suite"))?.is_empty());
        Ok(())
    }

    #[test]
    fn test_rejects_path_like_names() {
        let dir = tempdir().unwrap();
        let store = JsonSuiteStore::new(dir.path());
        assert!(store.load_suite("../secrets").is_err());
        assert!(store.load_suite("a/b").is_err());
    }
}
