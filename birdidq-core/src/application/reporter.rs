// birdidq-core/src/application/reporter.rs

use std::path::PathBuf;
use tracing::{info, instrument, warn};

use crate::application::docs::DataDocsBuilder;
use crate::application::ports::TemplateEngine;
use crate::application::quality::write_quality_report;
use crate::application::checkpoint::run_checkpoint;
use crate::domain::error::DomainError;
use crate::domain::ports::SuiteStore;
use crate::domain::run::ValidationRun;
use crate::domain::table::Table;
use crate::error::BirdiError;

/// What `publish` managed to do. Reporting problems end up in `warnings`, never in an `Err`.
#[derive(Debug, Clone, Default)]
pub struct ReportStatus {
    pub run: Option<ValidationRun>,
    pub docs_path: Option<PathBuf>,
    pub warnings: Vec<String>,
}

impl ReportStatus {
    /// The checkpoint ran and every rule passed.
    pub fn success(&self) -> bool {
        self.run.as_ref().is_some_and(|r| r.success)
    }

    fn warn(&mut self, message: String) {
        warn!("{message}");
        self.warnings.push(message);
    }
}

/// Checkpoint runs, data docs and the quality report, all driven from the store.
pub struct Reporter<'a> {
    store: &'a dyn SuiteStore,
    renderer: &'a dyn TemplateEngine,
    docs_dir: PathBuf,
}

impl<'a> Reporter<'a> {
    pub fn new(
        store: &'a dyn SuiteStore,
        renderer: &'a dyn TemplateEngine,
        docs_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            renderer,
            docs_dir: docs_dir.into(),
        }
    }

    pub fn store(&self) -> &'a dyn SuiteStore {
        self.store
    }

    /// Runs the persisted suite against `table`, stores the run, then rebuilds the docs.
    /// The docs are rebuilt even when the checkpoint could not run.
    #[instrument(skip(self, table), fields(rows = table.row_count()))]
    pub fn publish(&self, suite_name: &str, table: &Table) -> ReportStatus {
        let mut status = ReportStatus::default();

        match self.store.load_suite(suite_name) {
            Ok(Some(suite)) => {
                let run = run_checkpoint(&suite, table);
                info!(
                    "Checkpoint {}: {}/{} rules passed",
                    run.checkpoint_name,
                    run.statistics.successful_expectations,
                    run.statistics.evaluated_expectations
                );
                if let Err(e) = self.store.save_run(&run) {
                    status.warn(format!("Validation run not saved: {e}"));
                }
                status.run = Some(run);
            }
            Ok(None) => status.warn(format!(
                "{}, checkpoint skipped",
                DomainError::SuiteNotFound(suite_name.to_string())
            )),
            Err(e) => status.warn(format!("Checkpoint failed: {e}")),
        }

        match self.rebuild_docs() {
            Ok(path) => status.docs_path = Some(path),
            Err(e) => status.warn(format!("Data docs not rebuilt: {e}")),
        }
        status
    }

    pub fn rebuild_docs(&self) -> Result<PathBuf, BirdiError> {
        DataDocsBuilder::new(&self.docs_dir, self.renderer).build(self.store)
    }

    pub fn quality_report(&self) -> Result<PathBuf, BirdiError> {
        write_quality_report(self.store, self.renderer, &self.docs_dir)
    }
}
