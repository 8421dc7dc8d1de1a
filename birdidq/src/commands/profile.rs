// birdidq/src/commands/profile.rs
//
// USE CASE: Let a data assistant propose rules from the data.

use std::path::Path;

use birdidq_core::BirdiError;
use birdidq_core::application::{Reporter, run_assistant};
use birdidq_core::domain::profiling::DataAssistant;
use birdidq_core::infrastructure::adapters::JsonSuiteStore;
use birdidq_core::infrastructure::render::JinjaRenderer;

use crate::output::print_status;

pub async fn execute(project_dir: &Path, source: &str, assistant: &str) -> anyhow::Result<()> {
    let assistant: DataAssistant = assistant.parse().map_err(BirdiError::from)?;
    let config = super::config(project_dir)?;
    let dataset = super::dataset(source, &config)?;

    let store = JsonSuiteStore::new(&config.store_dir);
    let renderer = JinjaRenderer::new();
    let reporter = Reporter::new(&store, &renderer, &config.docs_dir);

    println!("🔬 Running the {} assistant on {}...", assistant, dataset.source());
    let outcome = run_assistant(assistant, dataset.as_ref(), &reporter).await?;

    println!(
        "📝 {} rule(s) proposed in suite '{}'",
        outcome.rule_count, outcome.suite_name
    );
    print_status(&outcome.status);
    Ok(())
}
