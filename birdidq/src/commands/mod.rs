// birdidq/src/commands/mod.rs

pub mod apply;
pub mod check;
pub mod clean;
pub mod docs;
pub mod ping;
pub mod preview;
pub mod profile;
pub mod report;
pub mod sources;

use anyhow::Context;
use std::path::Path;

use birdidq_core::BirdiError;
use birdidq_core::domain::source::DataSourceSpec;
use birdidq_core::infrastructure::config::{AppConfig, load_config};
use birdidq_core::infrastructure::open_dataset;
use birdidq_core::ports::DatasetProvider;

pub(crate) fn config(project_dir: &Path) -> anyhow::Result<AppConfig> {
    load_config(project_dir)
        .with_context(|| format!("Failed to load configuration from {}", project_dir.display()))
}

pub(crate) fn dataset(source: &str, config: &AppConfig) -> anyhow::Result<Box<dyn DatasetProvider>> {
    let spec: DataSourceSpec = source.parse().map_err(BirdiError::from)?;
    Ok(open_dataset(&spec, config)?)
}
