// birdidq/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use birdidq_core::infrastructure::SourceKind;

#[derive(Parser)]
#[command(name = "birdidq")]
#[command(about = "Natural-language data quality checks over files and databases", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Project directory (holds birdidq.yaml, data/ and gx/)
    #[arg(long, global = true, default_value = ".", env = "BIRDIDQ_PROJECT_DIR")]
    pub project_dir: PathBuf,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    File,
    Postgres,
    Oracle,
}

impl From<SourceArg> for SourceKind {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::File => SourceKind::File,
            SourceArg::Postgres => SourceKind::Postgres,
            SourceArg::Oracle => SourceKind::Oracle,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🗂️  Lists available datasets (files, PostgreSQL tables, Oracle tables)
    Sources {
        /// Only this kind of source
        #[arg(long, value_enum)]
        kind: Option<SourceArg>,
    },

    /// 👀 Shows the first rows of a dataset
    Preview {
        /// Datasource, e.g. "file:Orders", "postgres:public.orders", "oracle:CUSTOMERS"
        source: String,

        /// Number of rows (defaults to `preview_rows` from birdidq.yaml)
        #[arg(long, short)]
        limit: Option<usize>,
    },

    /// 🧠 Turns a plain-language request into rules, validates and reports
    Check {
        source: String,

        /// What to check, e.g. "amount should be greater than 0"
        request: String,

        /// Print the raw model response
        #[arg(long)]
        show_response: bool,
    },

    /// 📜 Executes rule statements from a file, without the model
    Apply {
        source: String,

        /// One `validator.expect_*(...)` statement per line; `#` comments allowed
        file: PathBuf,
    },

    /// 🔬 Profiles a dataset with a data assistant and proposes rules
    Profile {
        source: String,

        /// onboarding | missingness
        #[arg(long, short, default_value = "onboarding")]
        assistant: String,
    },

    /// 📚 Rebuilds the data docs from stored suites and runs
    Docs,

    /// 📊 Writes the quality report across all stored runs
    Report,

    /// 📡 Checks that the model endpoint answers
    Ping,

    /// 🧹 Removes generated suites, runs and docs
    Clean,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use clap::Parser;

    #[test]
    fn test_cli_parse_check() -> Result<()> {
        let args = Cli::parse_from([
            "birdidq",
            "check",
            "file:Orders",
            "amount should be greater than 0",
            "--project-dir",
            "/tmp/dq",
        ]);
        assert_eq!(args.project_dir.to_string_lossy(), "/tmp/dq");
        match args.command {
            Commands::Check {
                source,
                request,
                show_response,
            } => {
                assert_eq!(source, "file:Orders");
                assert_eq!(request, "amount should be greater than 0");
                assert!(!show_response);
                Ok(())
            }
            _ => bail!("Expected Check command"),
        }
    }

    #[test]
    fn test_cli_parse_profile_defaults() -> Result<()> {
        let args = Cli::parse_from(["birdidq", "profile", "pg:orders"]);
        match args.command {
            Commands::Profile { source, assistant } => {
                assert_eq!(source, "pg:orders");
                assert_eq!(assistant, "onboarding");
                Ok(())
            }
            _ => bail!("Expected Profile command"),
        }
    }

    #[test]
    fn test_cli_parse_sources_kind() -> Result<()> {
        let args = Cli::parse_from(["birdidq", "-vv", "sources", "--kind", "postgres"]);
        assert_eq!(args.verbose, 2);
        match args.command {
            Commands::Sources { kind } => {
                assert_eq!(kind.map(SourceKind::from), Some(SourceKind::Postgres));
                Ok(())
            }
            _ => bail!("Expected Sources command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["birdidq", "sources", "--kind", "mysql"]).is_err());
    }
}
