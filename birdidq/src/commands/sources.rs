// birdidq/src/commands/sources.rs
//
// USE CASE: List the datasets each configured source offers.

use std::path::Path;

use birdidq_core::infrastructure::{SourceKind, catalog};

use crate::cli::SourceArg;
use crate::output::print_table;

pub async fn execute(project_dir: &Path, kind: Option<SourceArg>) -> anyhow::Result<()> {
    let config = super::config(project_dir)?;
    let explicit = kind.is_some();
    let kinds: Vec<SourceKind> = match kind {
        Some(k) => vec![k.into()],
        None => SourceKind::ALL.to_vec(),
    };

    let mut rows = Vec::new();
    for kind in kinds {
        let listed = match catalog(kind, &config) {
            Ok(catalog) => catalog.list_datasets().await,
            Err(e) => Err(e),
        };
        match listed {
            Ok(datasets) => rows.extend(datasets.iter().map(|spec| {
                vec![
                    kind.label().to_string(),
                    spec.asset_name().to_string(),
                    spec.to_string(),
                ]
            })),
            Err(e) if explicit => return Err(e.into()),
            // Listing everything skips sources that are not configured or not reachable
            Err(e) => tracing::info!("{} skipped: {}", kind.label(), e),
        }
    }

    if rows.is_empty() {
        println!(
            "🤷 No datasets found (data directory: {})",
            config.data_dir.display()
        );
    } else {
        print_table(&["Source", "Dataset", "Use as"], rows);
    }
    Ok(())
}
