use anyhow::{Context, Result};
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Throwaway project: fixtures copied into a temp dir, environment scrubbed.
struct BirdiTestEnv {
    _tmp: TempDir,
    root: PathBuf,
}

impl BirdiTestEnv {
    fn new() -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let fixtures = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
        let dest = tmp.path().join("project");
        Self::copy_dir(&fixtures, &dest)?;

        Ok(Self {
            _tmp: tmp,
            root: dest,
        })
    }

    fn copy_dir(src: &Path, dst: &Path) -> std::io::Result<()> {
        let mut options = fs_extra::dir::CopyOptions::new();
        options.content_only = true;

        std::fs::create_dir_all(dst)?;
        fs_extra::dir::copy(src, dst, &options)
            .map(|_| ())
            .map_err(|e| std::io::Error::other(e.to_string()))
    }

    fn birdidq(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("birdidq"));
        cmd.current_dir(&self.root);
        for var in [
            "BIRDIDQ_PROJECT_DIR",
            "BIRDIDQ_DATA_DIR",
            "BIRDIDQ_STORE_DIR",
            "BIRDIDQ_DOCS_DIR",
            "BIRDIDQ_MAX_RETRIES",
            "BIRDIDQ_BACKOFF_BASE_SECS",
            "OLLAMA_CLOUD_BASE_URL",
            "OLLAMA_API_KEY",
            "OLLAMA_CLOUD_MODEL",
            "POSTGRES_CONNECTION_STRING",
            "ORACLE_CONNECTION_STRING",
        ] {
            cmd.env_remove(var);
        }
        cmd
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }
}

#[test]
fn test_sources_lists_csv_files() -> Result<()> {
    let env = BirdiTestEnv::new()?;

    env.birdidq()
        .arg("sources")
        .assert()
        .success()
        .stdout(predicate::str::contains("Orders"))
        .stdout(predicate::str::contains("file:Orders"));
    Ok(())
}

#[test]
fn test_sources_fails_for_unconfigured_kind() -> Result<()> {
    let env = BirdiTestEnv::new()?;

    env.birdidq()
        .args(["sources", "--kind", "postgres"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not set"));
    Ok(())
}

#[test]
fn test_preview_shows_rows() -> Result<()> {
    let env = BirdiTestEnv::new()?;

    env.birdidq()
        .args(["preview", "file:Orders", "--limit", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("shipped"))
        .stdout(predicate::str::contains("pending"))
        .stdout(predicate::str::contains("cancelled").not());
    Ok(())
}

#[test]
fn test_preview_unknown_dataset() -> Result<()> {
    let env = BirdiTestEnv::new()?;

    env.birdidq()
        .args(["preview", "file:Customers"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
    Ok(())
}

#[test]
fn test_unknown_source_kind_shows_help() -> Result<()> {
    let env = BirdiTestEnv::new()?;

    env.birdidq()
        .args(["preview", "mysql:orders"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown datasource"))
        .stderr(predicate::str::contains("👉"));
    Ok(())
}

#[test]
fn test_apply_registers_rules_and_builds_docs() -> Result<()> {
    let env = BirdiTestEnv::new()?;

    env.birdidq()
        .args(["apply", "file:Orders", "rules.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 registered, 1 failed"))
        .stdout(predicate::str::contains("Orders_checkpoint"));

    let suite_path = env.path("gx/suites/Orders_expectation_suite.json");
    let suite: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(&suite_path)
            .with_context(|| format!("missing {}", suite_path.display()))?,
    )?;
    assert_eq!(suite["expectations"].as_array().map(Vec::len), Some(3));

    assert!(env.path("gx/docs/index.html").exists());
    assert!(env.path("gx/docs/index.json").exists());
    Ok(())
}

#[test]
fn test_apply_without_valid_statements_fails() -> Result<()> {
    let env = BirdiTestEnv::new()?;
    std::fs::write(env.path("bad.txt"), "print('hello')\n")?;

    env.birdidq()
        .args(["apply", "file:Orders", "bad.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No executable rule statements"));

    assert!(!env.path("gx/suites/Orders_expectation_suite.json").exists());
    Ok(())
}

#[test]
fn test_profile_creates_assistant_suite() -> Result<()> {
    let env = BirdiTestEnv::new()?;

    env.birdidq()
        .args(["profile", "file:Orders"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Orders_onboarding_suite"))
        .stdout(predicate::str::contains("Orders_onboarding_suite_checkpoint"));

    assert!(env.path("gx/suites/Orders_onboarding_suite.json").exists());
    Ok(())
}

#[test]
fn test_report_after_apply() -> Result<()> {
    let env = BirdiTestEnv::new()?;

    env.birdidq()
        .arg("report")
        .assert()
        .success()
        .stdout(predicate::str::contains("No validation runs yet"));

    env.birdidq()
        .args(["apply", "file:Orders", "rules.txt"])
        .assert()
        .success();

    env.birdidq()
        .arg("report")
        .assert()
        .success()
        .stdout(predicate::str::contains("Orders_expectation_suite"));

    let report = std::fs::read_to_string(env.path("gx/docs/quality_report.md"))?;
    assert!(report.contains("# Data Quality Report"));
    Ok(())
}

#[test]
fn test_blank_check_request_is_rejected() -> Result<()> {
    let env = BirdiTestEnv::new()?;

    env.birdidq()
        .args(["check", "file:Orders", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid input"));
    Ok(())
}

#[test]
fn test_ping_unreachable_endpoint() -> Result<()> {
    let env = BirdiTestEnv::new()?;

    env.birdidq()
        .arg("ping")
        .env("OLLAMA_CLOUD_BASE_URL", "http://127.0.0.1:9")
        .env("BIRDIDQ_MAX_RETRIES", "1")
        .env("BIRDIDQ_BACKOFF_BASE_SECS", "0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unavailable after 1 attempt"));
    Ok(())
}

#[test]
fn test_clean_removes_generated_artifacts() -> Result<()> {
    let env = BirdiTestEnv::new()?;

    env.birdidq()
        .args(["apply", "file:Orders", "rules.txt"])
        .assert()
        .success();
    assert!(env.path("gx").exists());

    env.birdidq()
        .arg("clean")
        .assert()
        .success()
        .stdout(predicate::str::contains("Artifact removed: gx"));

    assert!(!env.path("gx").exists());
    assert!(env.path("data/orders.csv").exists());
    Ok(())
}

#[test]
fn test_docs_builds_empty_site() -> Result<()> {
    let env = BirdiTestEnv::new()?;

    env.birdidq()
        .arg("docs")
        .assert()
        .success()
        .stdout(predicate::str::contains("Data docs generated"));

    let html = std::fs::read_to_string(env.path("gx/docs/index.html"))?;
    assert!(html.contains("No suites yet"));
    Ok(())
}
