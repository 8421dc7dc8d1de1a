use crate::domain::error::DomainError;
use crate::domain::run::ValidationRun;
use crate::domain::suite::ValidationSuite;

/// Persistence for suites and checkpoint runs.
pub trait SuiteStore: Send + Sync {
    fn load_suite(&self, name: &str) -> Result<Option<ValidationSuite>, DomainError>;

    fn save_suite(&self, suite: &ValidationSuite) -> Result<(), DomainError>;

    /// Returns `false` when there was nothing to delete.
    fn delete_suite(&self, name: &str) -> Result<bool, DomainError>;

    fn list_suites(&self) -> Result<Vec<ValidationSuite>, DomainError>;

    fn save_run(&self, run: &ValidationRun) -> Result<(), DomainError>;

    /// Runs, oldest first, optionally restricted to one suite.
    fn list_runs(&self, suite: Option<&str>) -> Result<Vec<ValidationRun>, DomainError>;

    fn get_or_create_suite(
        &self,
        name: &str,
        asset: &str,
    ) -> Result<ValidationSuite, DomainError> {
        Ok(self
            .load_suite(name)?
            .unwrap_or_else(|| ValidationSuite::for_asset(name, asset)))
    }
}
