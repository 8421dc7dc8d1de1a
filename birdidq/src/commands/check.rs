// birdidq/src/commands/check.rs
//
// USE CASE: Natural-language request -> rules -> validation -> docs.

use std::path::Path;
use std::sync::Arc;

use birdidq_core::application::{ModelClient, Reporter, Sanitizer, run_check};
use birdidq_core::infrastructure::adapters::{JsonSuiteStore, OllamaGenerator};
use birdidq_core::infrastructure::render::JinjaRenderer;

use crate::output::{print_execution, print_status};

pub async fn execute(
    project_dir: &Path,
    source: &str,
    request: &str,
    show_response: bool,
) -> anyhow::Result<()> {
    let config = super::config(project_dir)?;
    let dataset = super::dataset(source, &config)?;

    let generator = Arc::new(OllamaGenerator::from_config(&config.model));
    let model = ModelClient::new(generator, config.retry.policy());
    let sanitizer = Sanitizer::new(config.sanitizer.clone())?;

    let store = JsonSuiteStore::new(&config.store_dir);
    let renderer = JinjaRenderer::new();
    let reporter = Reporter::new(&store, &renderer, &config.docs_dir);

    println!("🧠 Asking {} to write rules for {}...", model.model_name(), dataset.source());
    let outcome = run_check(request, dataset.as_ref(), &model, &sanitizer, &reporter).await?;

    if show_response {
        println!("\n--- Model response ---\n{}\n----------------------", outcome.raw_response.trim());
    }
    print_execution(&outcome.report);
    print_status(&outcome.status);
    Ok(())
}
