// birdidq-core/src/application/clean.rs

use std::fs;
use std::path::{Component, Path};

use crate::error::BirdiError;

/// Removes the configured artifact paths (suites, runs, docs) under `project_dir`.
/// Returns the targets that existed and were removed.
pub fn clean_project(project_dir: &Path, targets: &[String]) -> Result<Vec<String>, BirdiError> {
    tracing::info!("🧹 Cleaning generated artifacts...");
    let mut removed = Vec::new();

    for target_rel_path in targets {
        let relative = Path::new(target_rel_path);

        // Path traversal guard: relative paths only, no `..`
        let escapes = relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)));
        let full_path = project_dir.join(relative);
        if escapes || !full_path.starts_with(project_dir) || full_path == project_dir {
            return Err(BirdiError::UnsafePath(target_rel_path.clone()));
        }

        if full_path.is_dir() {
            fs::remove_dir_all(&full_path)?;
        } else if full_path.exists() {
            fs::remove_file(&full_path)?;
        } else {
            continue;
        }
        tracing::debug!("Artifact removed: {}", full_path.display());
        removed.push(target_rel_path.clone());
    }

    Ok(removed)
}
