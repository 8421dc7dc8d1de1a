// birdidq-core/src/application/quality.rs

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::application::ports::TemplateEngine;
use crate::domain::metrics::{GroupMetrics, QualityMetrics, RiskLevel};
use crate::domain::ports::SuiteStore;
use crate::error::BirdiError;
use crate::infrastructure::fs::atomic_write;

#[derive(Serialize)]
struct GroupRow {
    name: String,
    total: usize,
    successful: usize,
    exceptions: usize,
    success_rate: String,
    risk: RiskLevel,
}

fn rows(groups: &std::collections::BTreeMap<String, GroupMetrics>) -> Vec<GroupRow> {
    let mut rows: Vec<GroupRow> = groups
        .iter()
        .map(|(name, m)| GroupRow {
            name: name.clone(),
            total: m.total_expectations,
            successful: m.successful_expectations,
            exceptions: m.exceptions,
            success_rate: pct(m.success_rate()),
            risk: m.risk(),
        })
        .collect();
    // Worst first
    rows.sort_by(|a, b| b.risk.cmp(&a.risk).then_with(|| a.name.cmp(&b.name)));
    rows
}

fn pct(rate: f64) -> String {
    format!("{:.2}%", rate * 100.0)
}

/// Markdown summary of every stored validation run.
pub fn render_quality_report(
    metrics: &QualityMetrics,
    renderer: &dyn TemplateEngine,
) -> Result<String, BirdiError> {
    let context = serde_json::json!({
        "empty": metrics.is_empty(),
        "run_count": metrics.run_count,
        "total": metrics.overall.total_expectations,
        "overall_success_rate": pct(metrics.overall_success_rate()),
        "exception_rate": pct(metrics.exception_rate()),
        "overall_risk": metrics.overall.risk(),
        "first_run": metrics.first_run,
        "last_run": metrics.last_run,
        "lowest_suite": metrics.lowest_suite().map(|(n, m)| (n.to_string(), pct(m.success_rate()))),
        "lowest_type": metrics.lowest_type().map(|(n, m)| (n.to_string(), pct(m.success_rate()))),
        "suites": rows(&metrics.by_suite),
        "types": rows(&metrics.by_type),
        "columns": rows(&metrics.by_column),
    });
    renderer.render(REPORT_TEMPLATE, &context)
}

/// Computes metrics from the store and writes `quality_report.md` under `docs_dir`.
pub fn write_quality_report(
    store: &dyn SuiteStore,
    renderer: &dyn TemplateEngine,
    docs_dir: &Path,
) -> Result<PathBuf, BirdiError> {
    let runs = store.list_runs(None)?;
    let metrics = QualityMetrics::from_runs(&runs);
    let markdown = render_quality_report(&metrics, renderer)?;

    std::fs::create_dir_all(docs_dir)?;
    let path = docs_dir.join("quality_report.md");
    atomic_write(&path, markdown)?;
    Ok(path)
}

const REPORT_TEMPLATE: &str = r#"# Data Quality Report
{% if empty %}
No validation runs recorded yet.
{% else %}
Based on {{ total }} rule evaluations across {{ run_count }} validation run(s){% if first_run %}, from {{ first_run }} to {{ last_run }}{% endif %}.

## Summary

- **Overall success rate**: {{ overall_success_rate }} (risk: {{ overall_risk }})
- **Exception rate**: {{ exception_rate }}
{%- if lowest_suite %}
- **Lowest performing suite**: {{ lowest_suite[0] }} ({{ lowest_suite[1] }})
{%- endif %}
{%- if lowest_type %}
- **Most problematic rule type**: {{ lowest_type[0] }} ({{ lowest_type[1] }})
{%- endif %}

Risk levels: high below 70%, medium up to 85%, low above.
{% for section in [["Suites", suites], ["Rule types", types], ["Columns", columns]] %}
## {{ section[0] }}

| Name | Rules | Passed | Exceptions | Success rate | Risk |
|------|------:|-------:|-----------:|-------------:|------|
{%- for row in section[1] %}
| {{ row.name }} | {{ row.total }} | {{ row.successful }} | {{ row.exceptions }} | {{ row.success_rate }} | {{ row.risk }} |
{%- endfor %}
{% endfor %}
{%- endif %}
"#;
