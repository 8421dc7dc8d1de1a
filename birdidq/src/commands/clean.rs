// birdidq/src/commands/clean.rs
//
// USE CASE: Remove generated suites, runs and docs.

use std::path::Path;

use birdidq_core::application::clean_project;

pub fn execute(project_dir: &Path) -> anyhow::Result<()> {
    let config = super::config(project_dir)?;
    let removed = clean_project(project_dir, &config.clean_targets)?;

    if removed.is_empty() {
        println!("✨ Nothing to clean");
    }
    for target in removed {
        println!("   🗑️  Artifact removed: {target}");
    }
    Ok(())
}
