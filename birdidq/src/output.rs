// birdidq/src/output.rs
//
// Terminal rendering shared by the commands.

use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};

use birdidq_core::application::ReportStatus;
use birdidq_core::domain::outcome::{ExecutionReport, RuleOutcome};
use birdidq_core::domain::table::Table as DataTable;

fn table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(headers.iter().map(|h| Cell::new(h).fg(Color::Cyan)));
    table
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let mut t = table(headers);
    for row in rows {
        t.add_row(row);
    }
    println!("{t}");
}

pub fn print_data(data: &DataTable) {
    let headers: Vec<&str> = data.columns.iter().map(|c| c.name.as_str()).collect();
    let rows = data
        .rows
        .iter()
        .map(|row| row.iter().map(|v| v.to_string()).collect())
        .collect();
    print_table(&headers, rows);
}

/// Per-statement breakdown of one execution.
pub fn print_execution(report: &ExecutionReport) {
    let mut t = table(&["", "Statement", "Detail"]);
    for outcome in &report.outcomes {
        match outcome {
            RuleOutcome::Registered {
                statement, result, ..
            } => {
                let verdict = if result.success { "passes" } else { "violated" };
                let observed = result
                    .observed_value
                    .as_ref()
                    .map(|v| format!(", observed {v}"))
                    .or_else(|| {
                        result
                            .unexpected_percent
                            .map(|p| format!(", {p:.1}% unexpected"))
                    })
                    .unwrap_or_default();
                t.add_row(vec![
                    Cell::new("✅").fg(Color::Green),
                    Cell::new(statement),
                    Cell::new(format!("registered ({verdict}{observed})")),
                ]);
            }
            RuleOutcome::Failed { statement, error } => {
                t.add_row(vec![
                    Cell::new("❌").fg(Color::Red),
                    Cell::new(statement),
                    Cell::new(format!("{}: {}", error.kind, error.reason)).fg(Color::Red),
                ]);
            }
        }
    }
    println!("{t}");
    println!(
        "📝 {} registered, {} failed in suite '{}'",
        report.registered_count(),
        report.failed_count(),
        report.suite_name
    );
}

pub fn print_status(status: &ReportStatus) {
    match &status.run {
        Some(run) if run.success => println!(
            "✅ Checkpoint {} passed ({}/{} rules)",
            run.checkpoint_name,
            run.statistics.successful_expectations,
            run.statistics.evaluated_expectations
        ),
        Some(run) => println!(
            "❌ Checkpoint {}: {}/{} rules passed",
            run.checkpoint_name,
            run.statistics.successful_expectations,
            run.statistics.evaluated_expectations
        ),
        None => println!("⚠️  No checkpoint run"),
    }
    if let Some(path) = &status.docs_path {
        println!("📚 Data docs: {}", path.display());
    }
    for warning in &status.warnings {
        eprintln!("⚠️  {warning}");
    }
}
