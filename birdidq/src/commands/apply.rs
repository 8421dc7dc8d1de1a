// birdidq/src/commands/apply.rs
//
// USE CASE: Execute rule statements from a file.

use anyhow::Context;
use std::path::Path;

use birdidq_core::application::{Reporter, apply_statements};
use birdidq_core::infrastructure::adapters::JsonSuiteStore;
use birdidq_core::infrastructure::render::JinjaRenderer;

use crate::output::{print_execution, print_status};

pub async fn execute(project_dir: &Path, source: &str, file: &Path) -> anyhow::Result<()> {
    let config = super::config(project_dir)?;
    let dataset = super::dataset(source, &config)?;

    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Cannot read statements from {}", file.display()))?;
    let lines: Vec<&str> = content.lines().collect();

    let store = JsonSuiteStore::new(&config.store_dir);
    let renderer = JinjaRenderer::new();
    let reporter = Reporter::new(&store, &renderer, &config.docs_dir);

    println!("📜 Applying {} to {}...", file.display(), dataset.source());
    let outcome = apply_statements(&lines, dataset.as_ref(), &reporter).await?;

    print_execution(&outcome.report);
    print_status(&outcome.status);
    Ok(())
}
