//! Opening the sleuth database.
//!
//! Investigations and lessons are written as whole documents, one short
//! transaction per turn, so WAL with a generous busy timeout is enough to let
//! several CLI invocations share a file.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::domain::models::DatabaseConfig;

const BUSY_TIMEOUT: Duration = Duration::from_secs(30);
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Cannot create database directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot open database {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: sqlx::Error,
    },
}

/// Open the file named by `database.path`, creating it and its directory if needed.
pub async fn open_pool(config: &DatabaseConfig) -> Result<SqlitePool, ConnectionError> {
    let path = Path::new(config.path.strip_prefix("sqlite:").unwrap_or(&config.path));
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ConnectionError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections.max(1))
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(options)
        .await
        .map_err(|source| open_error(&config.path, source))?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(|source| open_error(&config.path, source))?;

    tracing::debug!(path = %config.path, max_connections = config.max_connections, "database opened");
    Ok(pool)
}

/// Private in-memory database on a single connection.
pub async fn open_in_memory() -> Result<SqlitePool, ConnectionError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(|source| open_error(":memory:", source))?
        .shared_cache(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(|source| open_error(":memory:", source))
}

fn open_error(path: &str, source: sqlx::Error) -> ConnectionError {
    ConnectionError::Open {
        path: path.to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_pool_creates_nested_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sleuth.db");
        let config = DatabaseConfig {
            path: path.to_string_lossy().to_string(),
            max_connections: 2,
        };

        let pool = open_pool(&config).await.unwrap();
        pool.close().await;
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_sqlite_prefix_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefixed.db");
        let config = DatabaseConfig {
            path: format!("sqlite:{}", path.display()),
            max_connections: 1,
        };

        open_pool(&config).await.unwrap().close().await;
        assert!(path.exists());
    }
}
