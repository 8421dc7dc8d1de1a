// birdidq-core/src/application/check.rs

use tracing::{info, instrument};

use crate::application::executor::execute;
use crate::application::model::ModelClient;
use crate::application::prompt::build_prompt;
use crate::application::reporter::{ReportStatus, Reporter};
use crate::application::sanitizer::Sanitizer;
use crate::application::validator::Validator;
use crate::domain::outcome::ExecutionReport;
use crate::domain::request::CheckRequest;
use crate::domain::suite::suite_name_for;
use crate::domain::table::Table;
use crate::error::BirdiError;
use crate::ports::dataset::DatasetProvider;

/// Everything one natural-language check produced.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub suite_name: String,
    pub raw_response: String,
    pub statements: Vec<String>,
    pub report: ExecutionReport,
    pub status: ReportStatus,
}

/// Result of executing statements that did not come from the model.
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    pub suite_name: String,
    pub report: ExecutionReport,
    pub status: ReportStatus,
}

/// Request text -> prompt -> model -> sanitized statements -> suite -> checkpoint -> docs.
///
/// Fails on an empty request, an unreachable model, a dataset that cannot be read,
/// or when not a single statement registers. Statements that fail individually
/// are reported in `report`.
#[instrument(skip_all, fields(source = %dataset.source()))]
pub async fn run_check(
    text: &str,
    dataset: &dyn DatasetProvider,
    model: &ModelClient,
    sanitizer: &Sanitizer,
    reporter: &Reporter<'_>,
) -> Result<CheckOutcome, BirdiError> {
    let request = CheckRequest::new(text)?.with_columns(dataset.column_names().await?);

    let prompt = build_prompt(&request);
    let raw_response = model.generate(&prompt).await?;
    let statements = sanitizer.sanitize(&raw_response);
    info!("{} candidate statement(s) after sanitizing", statements.len());

    let table = dataset.read_all().await?;
    let (suite_name, report, status) = register_and_publish(&statements, dataset, table, reporter)?;

    Ok(CheckOutcome {
        suite_name,
        raw_response,
        statements,
        report,
        status,
    })
}

/// Runs hand-written statements through the same executor as model output.
#[instrument(skip_all, fields(source = %dataset.source()))]
pub async fn apply_statements<S: AsRef<str>>(
    statements: &[S],
    dataset: &dyn DatasetProvider,
    reporter: &Reporter<'_>,
) -> Result<ApplyOutcome, BirdiError> {
    let table = dataset.read_all().await?;
    let (suite_name, report, status) = register_and_publish(statements, dataset, table, reporter)?;
    Ok(ApplyOutcome {
        suite_name,
        report,
        status,
    })
}

fn register_and_publish<S: AsRef<str>>(
    statements: &[S],
    dataset: &dyn DatasetProvider,
    table: Table,
    reporter: &Reporter<'_>,
) -> Result<(String, ExecutionReport, ReportStatus), BirdiError> {
    let source = dataset.source();
    let asset = source.asset_name();
    let suite_name = suite_name_for(asset);
    let suite = reporter.store().get_or_create_suite(&suite_name, asset)?;

    let mut validator = Validator::new(table, suite, source.engine());
    let report = execute(statements, &mut validator, reporter.store())?;
    let status = reporter.publish(&suite_name, validator.table());
    Ok((suite_name, report, status))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use crate::application::executor::tests::MemoryStore;
    use crate::application::model::tests::ScriptedGenerator;
    use crate::application::retry::RetryPolicy;
    use crate::domain::error::DomainError;
    use crate::domain::ports::SuiteStore;
    use crate::domain::source::DataSourceSpec;
    use crate::domain::table::{ColumnSchema, Value};
    use crate::infrastructure::render::JinjaRenderer;
    use crate::ports::generator::ModelError;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::tempdir;

    /// In-memory dataset.
    pub(crate) struct StaticDataset {
        pub source: DataSourceSpec,
        pub table: Table,
    }

    impl StaticDataset {
        pub(crate) fn new(table: Table) -> Self {
            Self {
                source: DataSourceSpec::File {
                    name: table.name.clone(),
                },
                table,
            }
        }
    }

    #[async_trait]
    impl DatasetProvider for StaticDataset {
        fn source(&self) -> &DataSourceSpec {
            &self.source
        }
        async fn list_columns(&self) -> Result<Vec<ColumnSchema>, BirdiError> {
            Ok(self.table.columns.clone())
        }
        async fn read_all(&self) -> Result<Table, BirdiError> {
            Ok(self.table.clone())
        }
    }

    /// A database that is down: every read fails and is counted.
    struct UnreachableDataset {
        source: DataSourceSpec,
        calls: AtomicUsize,
    }

    impl UnreachableDataset {
        fn new() -> Self {
            Self {
                source: DataSourceSpec::Oracle {
                    table: "ORDERS".to_string(),
                },
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DatasetProvider for UnreachableDataset {
        fn source(&self) -> &DataSourceSpec {
            &self.source
        }
        async fn list_columns(&self) -> Result<Vec<ColumnSchema>, BirdiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(BirdiError::InternalError("connection refused".into()))
        }
        async fn read_all(&self) -> Result<Table, BirdiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(BirdiError::InternalError("connection refused".into()))
        }
    }

    fn amounts(values: &[f64]) -> Table {
        Table::new(
            "Payments",
            vec![
                ColumnSchema::new("id", "BIGINT"),
                ColumnSchema::new("amount", "DOUBLE"),
            ],
        )
        .with_rows(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| vec![Value::Int(i as i64 + 1), Value::Float(*v)])
                .collect(),
        )
    }

    fn client(replies: Vec<Result<String, ModelError>>) -> (ModelClient, Arc<ScriptedGenerator>) {
        let generator = Arc::new(ScriptedGenerator::new(replies));
        let policy = RetryPolicy::new(3, Duration::from_millis(1), Duration::from_millis(1));
        (ModelClient::new(generator.clone(), policy), generator)
    }

    const BETWEEN: &str = "```python\nvalidator.expect_column_values_to_be_between(column=\"amount\", min_value=0, strict_min=True)\n```";

    #[tokio::test]
    async fn test_end_to_end_check_registers_rule() -> Result<()> {
        let store = MemoryStore::default();
        let dir = tempdir()?;
        let renderer = JinjaRenderer::new();
        let reporter = Reporter::new(&store, &renderer, dir.path());
        let (model, generator) = client(vec![Ok(BETWEEN.to_string())]);

        let outcome = run_check(
            "amount should be greater than 0",
            &StaticDataset::new(amounts(&[12.0, 3.5])),
            &model,
            &Sanitizer::default(),
            &reporter,
        )
        .await?;

        assert_eq!(outcome.suite_name, "Payments_expectation_suite");
        assert_eq!(outcome.report.registered_count(), 1);
        assert!(outcome.status.success());
        let prompt = generator.prompts.lock().unwrap()[0].clone();
        assert!(prompt.contains("\"amount\""));

        let suite = store.load_suite("Payments_expectation_suite")?.unwrap();
        assert_eq!(suite.rules[0].column(), Some("amount"));
        Ok(())
    }

    #[tokio::test]
    async fn test_verdict_follows_the_data() -> Result<()> {
        let store = MemoryStore::default();
        let dir = tempdir()?;
        let renderer = JinjaRenderer::new();
        let reporter = Reporter::new(&store, &renderer, dir.path());
        let (model, _) = client(vec![Ok(BETWEEN.to_string())]);

        let outcome = run_check(
            "amount should be greater than 0",
            &StaticDataset::new(amounts(&[12.0, -4.0])),
            &model,
            &Sanitizer::default(),
            &reporter,
        )
        .await?;

        assert_eq!(outcome.report.registered_count(), 1);
        assert!(!outcome.status.success());
        Ok(())
    }

    #[tokio::test]
    async fn test_blank_request_is_rejected_before_any_io() -> Result<()> {
        let store = MemoryStore::default();
        let renderer = JinjaRenderer::new();
        let dir = tempdir()?;
        let reporter = Reporter::new(&store, &renderer, dir.path());
        let (model, generator) = client(vec![]);

        let dataset = UnreachableDataset::new();

        let err = run_check("   ", &dataset, &model, &Sanitizer::default(), &reporter)
            .await
            .unwrap_err();

        assert!(matches!(err, BirdiError::Domain(DomainError::InvalidInput(_))));
        assert!(generator.prompts.lock().unwrap().is_empty());
        assert_eq!(dataset.calls.load(Ordering::SeqCst), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_dataset_errors_surface_for_valid_requests() -> Result<()> {
        let store = MemoryStore::default();
        let renderer = JinjaRenderer::new();
        let dir = tempdir()?;
        let reporter = Reporter::new(&store, &renderer, dir.path());
        let (model, generator) = client(vec![]);
        let dataset = UnreachableDataset::new();

        let err = run_check("amount positive", &dataset, &model, &Sanitizer::default(), &reporter)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("connection refused"));
        assert_eq!(dataset.calls.load(Ordering::SeqCst), 1);
        assert!(generator.prompts.lock().unwrap().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_prose_only_reply_is_no_executable_statements() -> Result<()> {
        let store = MemoryStore::default();
        let renderer = JinjaRenderer::new();
        let dir = tempdir()?;
        let reporter = Reporter::new(&store, &renderer, dir.path());
        let (model, _) = client(vec![Ok("I cannot help with that.".to_string())]);

        let err = run_check("amount positive", &StaticDataset::new(amounts(&[1.0])), &model, &Sanitizer::default(), &reporter)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            BirdiError::Domain(DomainError::NoExecutableStatements { attempted: 0, .. })
        ));
        assert!(store.suites.lock().unwrap().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_apply_uses_the_same_suite() -> Result<()> {
        let store = MemoryStore::default();
        let dir = tempdir()?;
        let renderer = JinjaRenderer::new();
        let reporter = Reporter::new(&store, &renderer, dir.path());
        let dataset = StaticDataset::new(amounts(&[1.0, 2.0]));

        let lines = [
            "# from the review",
            "validator.expect_column_values_to_be_unique(column='id')",
            "validator.expect_column_values_to_be_unique(column='missing')",
        ];
        let outcome = apply_statements(&lines, &dataset, &reporter).await?;

        assert_eq!(outcome.suite_name, "Payments_expectation_suite");
        assert_eq!(outcome.report.registered_count(), 1);
        assert_eq!(outcome.report.failed_count(), 1);
        assert_eq!(store.runs.lock().unwrap().len(), 1);
        Ok(())
    }
}
