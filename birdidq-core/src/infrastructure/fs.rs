// birdidq-core/src/infrastructure/fs.rs

use crate::infrastructure::error::InfrastructureError;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Writes `content` to `path` through a sibling temp file, so readers never see
/// a half-written suite, run or report.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = path.parent().unwrap_or_else(|| Path::new("."));

    // Same directory, so the rename never crosses filesystems
    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_ref())?;
    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}

/// Pretty JSON, written atomically. Creates the parent directory if needed.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), InfrastructureError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    atomic_write(path, json)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_overwrites_existing() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("suite.json");

        atomic_write(&file_path, "{}")?;
        atomic_write(&file_path, "{\"name\": \"orders\"}")?;

        assert_eq!(fs::read_to_string(file_path)?, "{\"name\": \"orders\"}");
        Ok(())
    }

    #[test]
    fn test_write_json_creates_parents() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("runs/orders/run.json");

        write_json(&path, &serde_json::json!({ "success": true }))?;

        let back: serde_json::Value = serde_json::from_str(&fs::read_to_string(path)?)?;
        assert_eq!(back["success"], true);
        Ok(())
    }
}
