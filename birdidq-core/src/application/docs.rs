// birdidq-core/src/application/docs.rs

use chrono::Utc;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::application::ports::TemplateEngine;
use crate::domain::metrics::QualityMetrics;
use crate::domain::ports::SuiteStore;
use crate::domain::run::ValidationRun;
use crate::domain::suite::ValidationSuite;
use crate::error::BirdiError;
use crate::infrastructure::fs::atomic_write;

/// Runs listed per suite in the site.
const RECENT_RUNS: usize = 5;

// --- DTOs ---
// Exactly what the docs page displays.

#[derive(Debug, Serialize)]
pub struct DocsArtifact {
    pub generated_at: String,
    pub suites: Vec<DocsSuite>,
    pub stats: DocsStats,
}

#[derive(Debug, Serialize)]
pub struct DocsStats {
    pub suite_count: usize,
    pub rule_count: usize,
    pub run_count: usize,
    pub overall_success_rate: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DocsSuite {
    pub name: String,
    pub data_asset: Option<String>,
    pub updated_at: String,
    pub rules: Vec<DocsRule>,
    pub runs: Vec<DocsRun>,
}

#[derive(Debug, Serialize)]
pub struct DocsRule {
    pub rule_type: String,
    pub column: Option<String>,
    pub statement: String,
    pub notes: Option<String>,
    /// Verdict in the latest run, if the rule took part in it.
    pub last_success: Option<bool>,
    pub observed: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DocsRun {
    pub run_name: String,
    pub run_time: String,
    pub success: bool,
    pub evaluated: usize,
    pub successful: usize,
    pub success_percent: Option<String>,
}

fn percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

impl DocsRun {
    fn from_run(run: &ValidationRun) -> Self {
        Self {
            run_name: run.run_name.clone(),
            run_time: run.run_time.to_rfc3339(),
            success: run.success,
            evaluated: run.statistics.evaluated_expectations,
            successful: run.statistics.successful_expectations,
            success_percent: run.statistics.success_percent.map(|p| format!("{p:.1}%")),
        }
    }
}

impl DocsSuite {
    fn from_suite(suite: &ValidationSuite, runs: &[&ValidationRun]) -> Self {
        let latest = runs.last();
        let rules = suite
            .rules
            .iter()
            .map(|rule| {
                let evaluation = latest.and_then(|run| {
                    run.results.iter().find(|e| e.rule.same_config(rule))
                });
                DocsRule {
                    rule_type: rule.rule_type.to_string(),
                    column: rule.column().map(str::to_string),
                    statement: rule.to_statement(),
                    notes: rule.notes.clone(),
                    last_success: evaluation.map(|e| e.success()),
                    observed: evaluation.and_then(|e| match &e.exception_info {
                        Some(info) => Some(info.exception_message.clone()),
                        None => e.result.observed_value.as_ref().map(|v| v.to_string()),
                    }),
                }
            })
            .collect();

        Self {
            name: suite.name.clone(),
            data_asset: suite.data_asset.clone(),
            updated_at: suite.updated_at.to_rfc3339(),
            rules,
            runs: runs
                .iter()
                .rev()
                .take(RECENT_RUNS)
                .map(|r| DocsRun::from_run(r))
                .collect(),
        }
    }
}

// --- BUILDER ---

/// Regenerates the report site (`index.json` + `index.html`) from the store.
pub struct DataDocsBuilder<'a> {
    docs_dir: PathBuf,
    renderer: &'a dyn TemplateEngine,
}

impl<'a> DataDocsBuilder<'a> {
    pub fn new(docs_dir: impl Into<PathBuf>, renderer: &'a dyn TemplateEngine) -> Self {
        Self {
            docs_dir: docs_dir.into(),
            renderer,
        }
    }

    pub fn docs_dir(&self) -> &Path {
        &self.docs_dir
    }

    pub fn collect(&self, store: &dyn SuiteStore) -> Result<DocsArtifact, BirdiError> {
        let suites = store.list_suites()?;
        let runs = store.list_runs(None)?;
        let metrics = QualityMetrics::from_runs(&runs);

        let docs_suites: Vec<DocsSuite> = suites
            .iter()
            .map(|suite| {
                let suite_runs: Vec<&ValidationRun> =
                    runs.iter().filter(|r| r.suite_name == suite.name).collect();
                DocsSuite::from_suite(suite, &suite_runs)
            })
            .collect();

        Ok(DocsArtifact {
            generated_at: Utc::now().to_rfc3339(),
            stats: DocsStats {
                suite_count: docs_suites.len(),
                rule_count: docs_suites.iter().map(|s| s.rules.len()).sum(),
                run_count: runs.len(),
                overall_success_rate: (!metrics.is_empty())
                    .then(|| percent(metrics.overall_success_rate())),
            },
            suites: docs_suites,
        })
    }

    /// Writes the site and returns the path of `index.html`.
    pub fn build(&self, store: &dyn SuiteStore) -> Result<PathBuf, BirdiError> {
        let artifact = self.collect(store)?;
        std::fs::create_dir_all(&self.docs_dir)?;

        let context = serde_json::to_value(&artifact)
            .map_err(|e| BirdiError::InternalError(format!("docs serialization: {e}")))?;

        let json_path = self.docs_dir.join("index.json");
        let json = serde_json::to_string_pretty(&context)
            .map_err(|e| BirdiError::InternalError(format!("docs serialization: {e}")))?;
        atomic_write(&json_path, json)?;

        let html_path = self.docs_dir.join("index.html");
        let html = self.renderer.render(DOCS_TEMPLATE, &context)?;
        atomic_write(&html_path, html)?;

        info!("Data docs rebuilt at {}", html_path.display());
        Ok(html_path)
    }
}

// --- EMBEDDED TEMPLATE ---
// Single static page, no JavaScript.
const DOCS_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>BirdiDQ Data Docs</title>
    <script src="https://cdn.tailwindcss.com"></script>
</head>
<body class="bg-gray-50 text-gray-900 font-sans">
    <nav class="bg-slate-900 text-white p-4 shadow-lg">
        <div class="container mx-auto flex justify-between items-center">
            <h1 class="text-xl font-bold tracking-tight">🐦 BirdiDQ Data Docs</h1>
            <div class="text-sm text-gray-400">Generated {{ generated_at|e }}</div>
        </div>
    </nav>

    <main class="container mx-auto p-6 space-y-8">
        <section class="grid grid-cols-4 gap-4">
            <div class="bg-white rounded shadow p-4"><div class="text-gray-500 text-sm">Suites</div><div class="text-2xl font-bold">{{ stats.suite_count }}</div></div>
            <div class="bg-white rounded shadow p-4"><div class="text-gray-500 text-sm">Rules</div><div class="text-2xl font-bold">{{ stats.rule_count }}</div></div>
            <div class="bg-white rounded shadow p-4"><div class="text-gray-500 text-sm">Runs</div><div class="text-2xl font-bold">{{ stats.run_count }}</div></div>
            <div class="bg-white rounded shadow p-4"><div class="text-gray-500 text-sm">Success rate</div><div class="text-2xl font-bold">{{ stats.overall_success_rate or "n/a" }}</div></div>
        </section>

        {% for suite in suites %}
        <section class="bg-white rounded shadow p-6" id="{{ suite.name|e }}">
            <h2 class="text-lg font-bold">{{ suite.name|e }}</h2>
            <p class="text-sm text-gray-500">Asset: {{ (suite.data_asset or "unknown")|e }} · updated {{ suite.updated_at|e }}</p>

            <table class="w-full mt-4 text-sm">
                <thead><tr class="text-left border-b"><th>Status</th><th>Rule</th><th>Column</th><th>Observed</th></tr></thead>
                <tbody>
                {% for rule in suite.rules %}
                    <tr class="border-b align-top">
                        <td>{% if rule.last_success is none %}⏳{% elif rule.last_success %}✅{% else %}❌{% endif %}</td>
                        <td><code>{{ rule.rule_type|e }}</code>
                            {% if rule.notes %}<details><summary class="text-blue-600 cursor-pointer">Details</summary><pre class="whitespace-pre-wrap bg-gray-100 p-2">{{ rule.notes|e }}</pre></details>{% endif %}
                        </td>
                        <td>{{ (rule.column or "table-level")|e }}</td>
                        <td>{{ (rule.observed or "")|e }}</td>
                    </tr>
                {% else %}
                    <tr><td colspan="4" class="text-gray-400">No rules yet.</td></tr>
                {% endfor %}
                </tbody>
            </table>

            {% if suite.runs %}
            <h3 class="font-semibold mt-4">Recent runs</h3>
            <ul class="text-sm">
                {% for run in suite.runs %}
                <li>{% if run.success %}✅{% else %}❌{% endif %} {{ run.run_name|e }}: {{ run.successful }}/{{ run.evaluated }} ({{ run.success_percent or "n/a" }})</li>
                {% endfor %}
            </ul>
            {% endif %}
        </section>
        {% else %}
        <p class="text-gray-500">No suites yet. Run <code>birdidq check</code> or <code>birdidq profile</code> first.</p>
        {% endfor %}
    </main>
</body>
</html>
"#;
