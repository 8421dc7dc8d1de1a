// birdidq/src/commands/preview.rs
//
// USE CASE: Show the first rows of a dataset.

use std::path::Path;

use crate::output::print_data;

pub async fn execute(project_dir: &Path, source: &str, limit: Option<usize>) -> anyhow::Result<()> {
    let config = super::config(project_dir)?;
    let dataset = super::dataset(source, &config)?;
    let limit = limit.unwrap_or(config.preview_rows);

    let preview = dataset.preview(limit).await?;
    println!("\n🔍 {} (first {} rows)", dataset.source(), limit);
    print_data(&preview);
    Ok(())
}
