// birdidq/src/main.rs

mod cli;
mod commands;
mod output;

use clap::Parser;
use tracing::Level;

use birdidq_core::BirdiError;
use birdidq_core::domain::DomainError;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so tables and verdicts stay clean on stdout
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let project_dir = cli.project_dir;
    let result = match cli.command {
        // --- USE CASE: DISCOVERY ---
        Commands::Sources { kind } => commands::sources::execute(&project_dir, kind).await,
        Commands::Preview { source, limit } => {
            commands::preview::execute(&project_dir, &source, limit).await
        }

        // --- USE CASE: RULES ---
        Commands::Check {
            source,
            request,
            show_response,
        } => commands::check::execute(&project_dir, &source, &request, show_response).await,
        Commands::Apply { source, file } => {
            commands::apply::execute(&project_dir, &source, &file).await
        }
        Commands::Profile { source, assistant } => {
            commands::profile::execute(&project_dir, &source, &assistant).await
        }

        // --- USE CASE: REPORTING ---
        Commands::Docs => commands::docs::execute(&project_dir),
        Commands::Report => commands::report::execute(&project_dir),

        // --- MAINTENANCE ---
        Commands::Ping => commands::ping::execute(&project_dir).await,
        Commands::Clean => commands::clean::execute(&project_dir),
    };

    if let Err(e) = result {
        report_error(&e);
        std::process::exit(1);
    }
}

fn report_error(err: &anyhow::Error) {
    eprintln!("\n❌ {err:#}");

    // Use cases return either the facade error or a bare domain error
    let domain = match err.downcast_ref::<BirdiError>() {
        Some(BirdiError::Domain(e)) => Some(e),
        Some(other) => {
            if let Some(help) = other.help() {
                eprintln!("👉 {help}");
            }
            return;
        }
        None => err.downcast_ref::<DomainError>(),
    };
    let Some(domain) = domain else {
        return;
    };

    if let DomainError::NoExecutableStatements { reasons, .. } = domain {
        for reason in reasons {
            eprintln!("   - {reason}");
        }
    }
    if let Some(help) = miette::Diagnostic::help(domain) {
        eprintln!("👉 {help}");
    }
}
