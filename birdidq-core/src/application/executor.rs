// birdidq-core/src/application/executor.rs

use tracing::{info, instrument, warn};

use crate::application::isolate::isolate_each;
use crate::application::validator::Validator;
use crate::domain::error::DomainError;
use crate::domain::outcome::{ExecutionReport, FailureKind, RuleOutcome, StatementError};
use crate::domain::ports::SuiteStore;

/// Statements worth attempting: blank lines and `#` comments are dropped.
pub fn executable_statements<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    lines
        .iter()
        .map(|l| l.as_ref().trim())
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Registers every statement it can, then persists the suite.
///
/// A failing statement is recorded and skipped. When nothing registers the suite
/// is not saved and `NoExecutableStatements` is returned.
#[instrument(skip_all, fields(suite = %validator.suite().name))]
pub fn execute<S: AsRef<str>>(
    statements: &[S],
    validator: &mut Validator,
    store: &dyn SuiteStore,
) -> Result<ExecutionReport, DomainError> {
    let statements = executable_statements(statements);
    info!("Executing {} statement(s)", statements.len());

    let results = isolate_each(
        &statements,
        |statement| validator.register_rule(statement),
        |panic| StatementError::new(FailureKind::Evaluation, format!("evaluation panicked: {panic}")),
    );

    let outcomes: Vec<RuleOutcome> = statements
        .iter()
        .zip(results)
        .map(|(statement, result)| match result {
            Ok(reg) => RuleOutcome::Registered {
                statement: statement.clone(),
                rule: reg.rule,
                result: reg.result,
            },
            Err(error) => {
                warn!("Statement rejected ({error}): {statement}");
                RuleOutcome::Failed {
                    statement: statement.clone(),
                    error,
                }
            }
        })
        .collect();

    let report = ExecutionReport {
        suite_name: validator.suite().name.clone(),
        outcomes,
    };

    if report.registered_count() == 0 {
        return Err(DomainError::NoExecutableStatements {
            attempted: report.outcomes.len(),
            reasons: report.failure_reasons(),
        });
    }

    store.save_suite(validator.suite())?;
    info!(
        "Suite '{}' saved: {} registered, {} failed",
        report.suite_name,
        report.registered_count(),
        report.failed_count()
    );
    Ok(report)
}
