// birdidq-core/src/application/assistant.rs

use tracing::{info, instrument};

use crate::application::reporter::{ReportStatus, Reporter};
use crate::domain::profiling::DataAssistant;
use crate::domain::rule::notes::implementation_note;
use crate::domain::suite::ValidationSuite;
use crate::error::BirdiError;
use crate::ports::dataset::DatasetProvider;

#[derive(Debug, Clone)]
pub struct AssistantOutcome {
    pub suite_name: String,
    pub rule_count: usize,
    pub status: ReportStatus,
}

/// Profiles the dataset, replaces `<asset>_<assistant>_suite` with the proposed
/// rules, then runs the checkpoint and rebuilds the docs.
#[instrument(skip(dataset, reporter), fields(source = %dataset.source()))]
pub async fn run_assistant(
    assistant: DataAssistant,
    dataset: &dyn DatasetProvider,
    reporter: &Reporter<'_>,
) -> Result<AssistantOutcome, BirdiError> {
    let table = dataset.read_all().await?;
    let source = dataset.source();
    let asset = source.asset_name();
    let suite_name = assistant.suite_name(asset);

    // Recreated from scratch on every run
    if reporter.store().delete_suite(&suite_name)? {
        info!("Previous '{}' discarded", suite_name);
    }

    let mut suite = ValidationSuite::for_asset(&suite_name, asset);
    for mut rule in assistant.propose(&table) {
        rule.notes = Some(implementation_note(&rule, source.engine(), &table.name));
        suite.add_rule(rule);
    }
    let rule_count = suite.len();
    reporter.store().save_suite(&suite)?;
    info!("{} assistant proposed {} rule(s)", assistant, rule_count);

    let status = reporter.publish(&suite_name, &table);
    Ok(AssistantOutcome {
        suite_name,
        rule_count,
        status,
    })
}
