// birdidq-core/src/application/checkpoint.rs

use tracing::{info, warn};

use crate::domain::run::{RuleEvaluation, ValidationRun};
use crate::domain::suite::ValidationSuite;
use crate::domain::table::Table;

/// Evaluates every rule of `suite` against `table`.
///
/// A rule that no longer binds (its column was dropped, say) is reported as an
/// exception for that rule; the other rules still run.
pub fn run_checkpoint(suite: &ValidationSuite, table: &Table) -> ValidationRun {
    let asset = suite.data_asset.clone().unwrap_or_else(|| table.name.clone());
    let checkpoint = suite.checkpoint_name();
    info!("Running checkpoint '{}' ({} rules)", checkpoint, suite.len());

    let results = suite
        .rules
        .iter()
        .map(|rule| match rule.bind(table) {
            Ok(check) => RuleEvaluation {
                rule: rule.clone(),
                result: check.evaluate(table),
                exception_info: None,
            },
            Err(e) => {
                warn!("Rule {} could not run: {}", rule.rule_type, e);
                RuleEvaluation::raised(rule.clone(), e.to_string())
            }
        })
        .collect();

    ValidationRun::new(checkpoint, &suite.name, asset, results)
}
