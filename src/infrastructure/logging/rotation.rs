//! Retention cleanup for rolled log files.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use std::path::Path;
use tracing::{debug, warn};

/// Delete rolled `sleuth.log*` files older than `retention_days`.
///
/// Returns the number of files deleted. A missing directory is not an error.
pub async fn cleanup_old_logs(log_dir: impl AsRef<Path>, retention_days: u32) -> Result<usize> {
    let log_dir = log_dir.as_ref();
    if !log_dir.exists() {
        warn!(path = %log_dir.display(), "log directory does not exist");
        return Ok(0);
    }

    let cutoff = Utc::now() - Duration::days(i64::from(retention_days));
    let mut deleted = 0;
    let mut entries = tokio::fs::read_dir(log_dir)
        .await
        .context("failed to read log directory")?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .context("failed to read directory entry")?
    {
        let path = entry.path();
        let is_log = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("sleuth.log"));
        if !is_log {
            continue;
        }

        let modified: DateTime<Utc> = entry
            .metadata()
            .await
            .and_then(|m| m.modified())
            .context("failed to read log file metadata")?
            .into();

        if modified < cutoff {
            tokio::fs::remove_file(&path)
                .await
                .with_context(|| format!("failed to delete {}", path.display()))?;
            debug!(path = %path.display(), "deleted expired log file");
            deleted += 1;
        }
    }

    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_cleanup_keeps_recent_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("sleuth.log.2026-10-01"), "{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "keep").unwrap();

        let deleted = cleanup_old_logs(dir.path(), 30).await.unwrap();
        assert_eq!(deleted, 0);
        assert!(dir.path().join("notes.txt").exists());
    }

    #[tokio::test]
    async fn test_cleanup_missing_dir() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent");
        assert_eq!(cleanup_old_logs(&missing, 30).await.unwrap(), 0);
    }
}
