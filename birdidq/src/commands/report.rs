// birdidq/src/commands/report.rs
//
// USE CASE: Quality metrics across every stored validation run.

use std::path::Path;

use birdidq_core::domain::metrics::QualityMetrics;
use birdidq_core::domain::ports::SuiteStore;
use birdidq_core::application::Reporter;
use birdidq_core::infrastructure::adapters::JsonSuiteStore;
use birdidq_core::infrastructure::render::JinjaRenderer;

use crate::output::print_table;

pub fn execute(project_dir: &Path) -> anyhow::Result<()> {
    let config = super::config(project_dir)?;
    let store = JsonSuiteStore::new(&config.store_dir);
    let renderer = JinjaRenderer::new();

    let metrics = QualityMetrics::from_runs(&store.list_runs(None)?);
    if metrics.is_empty() {
        println!("🤷 No validation runs yet. Run `birdidq check` or `birdidq profile` first.");
    } else {
        println!(
            "📊 {} run(s), overall success rate {:.2}% (risk: {})",
            metrics.run_count,
            metrics.overall_success_rate() * 100.0,
            format!("{:?}", metrics.overall.risk()).to_lowercase()
        );
        let rows = metrics
            .by_suite
            .iter()
            .map(|(name, m)| {
                vec![
                    name.clone(),
                    m.total_expectations.to_string(),
                    format!("{:.2}%", m.success_rate() * 100.0),
                    format!("{:?}", m.risk()).to_lowercase(),
                ]
            })
            .collect();
        print_table(&["Suite", "Rules evaluated", "Success rate", "Risk"], rows);
    }

    let path = Reporter::new(&store, &renderer, &config.docs_dir).quality_report()?;
    println!("✨ Quality report written to {}", path.display());
    Ok(())
}
