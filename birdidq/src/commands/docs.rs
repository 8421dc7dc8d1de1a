// birdidq/src/commands/docs.rs
//
// USE CASE: Rebuild the data docs (HTML/JSON).

use std::path::Path;

use birdidq_core::application::DataDocsBuilder;
use birdidq_core::infrastructure::adapters::JsonSuiteStore;
use birdidq_core::infrastructure::render::JinjaRenderer;

pub fn execute(project_dir: &Path) -> anyhow::Result<()> {
    println!("📚 Building data docs...");
    let config = super::config(project_dir)?;

    let store = JsonSuiteStore::new(&config.store_dir);
    let renderer = JinjaRenderer::new();
    let index = DataDocsBuilder::new(&config.docs_dir, &renderer).build(&store)?;

    println!("✨ Data docs generated at {}", index.display());
    Ok(())
}
