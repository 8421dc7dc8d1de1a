// birdidq/src/commands/ping.rs
//
// USE CASE: Check endpoint, credential and model in one call.

use std::path::Path;
use std::sync::Arc;

use birdidq_core::application::ModelClient;
use birdidq_core::infrastructure::adapters::OllamaGenerator;

pub async fn execute(project_dir: &Path) -> anyhow::Result<()> {
    let config = super::config(project_dir)?;
    let generator = OllamaGenerator::from_config(&config.model);
    println!("📡 Pinging {} at {}...", config.model.model, generator.base_url());

    let client = ModelClient::new(Arc::new(generator), config.retry.policy());
    let report = client.ping().await?;

    println!("✅ {} answered: {}", report.model, report.reply);
    Ok(())
}
