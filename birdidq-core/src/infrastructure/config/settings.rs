// birdidq-core/src/infrastructure/config/settings.rs

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::application::retry::RetryPolicy;
use crate::application::sanitizer::SanitizerConfig;
use crate::infrastructure::error::InfrastructureError;

pub const CONFIG_FILE: &str = "birdidq.yaml";

// --- SECTIONS ---

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ModelConfig {
    #[validate(url)]
    pub base_url: String,
    /// Bearer credential. Usually supplied through `OLLAMA_API_KEY`.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    #[validate(length(min = 1))]
    pub model: String,
    #[validate(range(min = 0.0, max = 2.0))]
    pub temperature: f32,
    #[validate(range(min = 0.0, max = 1.0))]
    pub top_p: f32,
    #[validate(range(min = 1))]
    pub max_tokens: u32,
    #[validate(range(min = 1))]
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ollama.com".to_string(),
            api_key: None,
            model: "gpt-oss:20b".to_string(),
            temperature: 0.3,
            top_p: 0.9,
            max_tokens: 200,
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RetryConfig {
    #[validate(range(min = 1, max = 20))]
    pub max_attempts: usize,
    pub backoff_base_secs: u64,
    pub backoff_max_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base_secs: 2,
            backoff_max_secs: 60,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_secs(self.backoff_base_secs),
            Duration::from_secs(self.backoff_max_secs),
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionsConfig {
    #[serde(skip_serializing)]
    pub postgres: Option<String>,
    #[serde(skip_serializing)]
    pub oracle: Option<String>,
}

/// Everything `birdidq` reads at startup.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AppConfig {
    /// Folder scanned for CSV and Parquet files.
    pub data_dir: PathBuf,
    /// Suites and validation runs.
    pub store_dir: PathBuf,
    /// Generated data docs and quality report.
    pub docs_dir: PathBuf,
    #[validate(range(min = 1))]
    pub preview_rows: usize,
    /// Paths `birdidq clean` removes, relative to the project root.
    pub clean_targets: Vec<String>,

    #[validate(nested)]
    pub model: ModelConfig,
    #[validate(nested)]
    pub retry: RetryConfig,
    pub connections: ConnectionsConfig,
    pub sanitizer: SanitizerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            store_dir: PathBuf::from("gx"),
            docs_dir: PathBuf::from("gx/docs"),
            preview_rows: 10,
            clean_targets: vec!["gx".to_string()],
            model: ModelConfig::default(),
            retry: RetryConfig::default(),
            connections: ConnectionsConfig::default(),
            sanitizer: SanitizerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Relative paths are resolved against the project root.
    pub fn resolve_paths(&mut self, root: &Path) {
        for dir in [&mut self.data_dir, &mut self.store_dir, &mut self.docs_dir] {
            if dir.is_relative() {
                *dir = root.join(&*dir);
            }
        }
    }
}

// --- LOADER ---

/// Reads `birdidq.yaml` from `project_dir` (defaults when absent), layers the
/// environment on top, resolves paths and validates the result.
#[instrument(skip(project_dir))]
pub fn load_config(project_dir: &Path) -> Result<AppConfig, InfrastructureError> {
    load_config_with(project_dir, |key| std::env::var(key).ok())
}

/// Same as [`load_config`] with an explicit environment lookup.
pub fn load_config_with(
    project_dir: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<AppConfig, InfrastructureError> {
    let config_path = project_dir.join(CONFIG_FILE);
    let mut config = if config_path.exists() {
        info!(path = ?config_path, "Loading configuration");
        let content = fs::read_to_string(&config_path)?;
        // An empty file deserializes to null
        if content.trim().is_empty() {
            AppConfig::default()
        } else {
            serde_yaml::from_str(&content)?
        }
    } else {
        AppConfig::default()
    };

    apply_env_overrides(&mut config, &env)?;
    config.resolve_paths(project_dir);
    config.validate()?;
    Ok(config)
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, InfrastructureError> {
    raw.trim()
        .parse()
        .map_err(|_| InfrastructureError::ConfigError(format!("{key}='{raw}' is not a valid number")))
}

fn apply_env_overrides(
    config: &mut AppConfig,
    env: &impl Fn(&str) -> Option<String>,
) -> Result<(), InfrastructureError> {
    let set = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    if let Some(val) = set("OLLAMA_CLOUD_BASE_URL") {
        info!(new = %val, "Overriding model endpoint via ENV");
        config.model.base_url = val.trim_end_matches('/').to_string();
    }
    if let Some(val) = set("OLLAMA_API_KEY") {
        config.model.api_key = Some(val);
    }
    if let Some(val) = set("OLLAMA_CLOUD_MODEL") {
        info!(new = %val, "Overriding model via ENV");
        config.model.model = val;
    }
    if let Some(val) = set("POSTGRES_CONNECTION_STRING") {
        config.connections.postgres = Some(val);
    }
    if let Some(val) = set("ORACLE_CONNECTION_STRING") {
        config.connections.oracle = Some(val);
    }
    if let Some(val) = set("BIRDIDQ_DATA_DIR") {
        config.data_dir = PathBuf::from(val);
    }
    if let Some(val) = set("BIRDIDQ_STORE_DIR") {
        config.store_dir = PathBuf::from(val);
    }
    if let Some(val) = set("BIRDIDQ_DOCS_DIR") {
        config.docs_dir = PathBuf::from(val);
    }
    if let Some(val) = set("BIRDIDQ_MAX_RETRIES") {
        config.retry.max_attempts = parse_env("BIRDIDQ_MAX_RETRIES", &val)?;
    }
    if let Some(val) = set("BIRDIDQ_BACKOFF_BASE_SECS") {
        config.retry.backoff_base_secs = parse_env("BIRDIDQ_BACKOFF_BASE_SECS", &val)?;
    }

    if config.model.api_key.is_none() && config.model.base_url.starts_with("https://ollama.com") {
        warn!("OLLAMA_API_KEY is not set, the hosted endpoint will reject requests");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_without_file() -> Result<()> {
        let dir = tempdir()?;
        let config = load_config_with(dir.path(), no_env)?;
        assert_eq!(config.model.model, "gpt-oss:20b");
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.data_dir, dir.path().join("data"));
        assert_eq!(config.sanitizer.statement_prefix, "validator.expect_");
        Ok(())
    }

    #[test]
    fn test_yaml_then_env_layering() -> Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join(CONFIG_FILE),
            "data_dir: /srv/csv\nmodel:\n  model: llama3\n  temperature: 0.1\nretry:\n  max_attempts: 5\nsanitizer:\n  deny_markers: [\"hmm\"]\n",
        )?;
        let vars: HashMap<&str, &str> = HashMap::from([
            ("OLLAMA_CLOUD_MODEL", "qwen3"),
            ("OLLAMA_CLOUD_BASE_URL", "http://localhost:11434/"),
            ("BIRDIDQ_BACKOFF_BASE_SECS", "1"),
        ]);

        let config = load_config_with(dir.path(), |k| vars.get(k).map(|v| v.to_string()))?;

        assert_eq!(config.data_dir, PathBuf::from("/srv/csv"));
        assert_eq!(config.model.model, "qwen3");
        assert_eq!(config.model.base_url, "http://localhost:11434");
        assert!((config.model.temperature - 0.1).abs() < f32::EPSILON);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.policy().base_delay, Duration::from_secs(1));
        assert_eq!(config.sanitizer.deny_markers, vec!["hmm".to_string()]);
        // Untouched sanitizer fields keep their defaults
        assert_eq!(config.sanitizer.statement_prefix, "validator.expect_");
        Ok(())
    }

    #[test]
    fn test_invalid_values_are_rejected() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join(CONFIG_FILE), "retry:\n  max_attempts: 0\n")?;
        let err = load_config_with(dir.path(), no_env).unwrap_err();
        assert!(matches!(err, InfrastructureError::ConfigInvalid(_)));

        let err = load_config_with(dir.path().join("missing").as_path(), |k| {
            (k == "BIRDIDQ_MAX_RETRIES").then(|| "three".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, InfrastructureError::ConfigError(_)));
        Ok(())
    }
}
