//! Short ID prefix resolution for CLI commands.
//!
//! Any unique prefix of a UUID is accepted instead of the full id, similar to
//! git short hashes. Only the owner's records are searched.

use anyhow::{bail, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

const INVESTIGATION_QUERY: &str = "SELECT id FROM investigations WHERE owner = ? AND id LIKE ?";
const LESSON_QUERY: &str = "SELECT id FROM lessons WHERE owner = ? AND id LIKE ?";

/// Resolve an investigation ID prefix to a full UUID.
pub async fn resolve_investigation_id(pool: &SqlitePool, owner: &str, prefix: &str) -> Result<Uuid> {
    resolve_prefix(pool, owner, prefix, "investigation", INVESTIGATION_QUERY).await
}

/// Resolve a lesson ID prefix to a full UUID.
pub async fn resolve_lesson_id(pool: &SqlitePool, owner: &str, prefix: &str) -> Result<Uuid> {
    resolve_prefix(pool, owner, prefix, "lesson", LESSON_QUERY).await
}

fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() {
        bail!("ID prefix must not be empty");
    }
    if !prefix.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
        bail!("Invalid ID prefix '{prefix}': must contain only hex characters and dashes");
    }
    Ok(())
}

async fn resolve_prefix(pool: &SqlitePool, owner: &str, prefix: &str, entity: &str, query: &str) -> Result<Uuid> {
    if let Ok(uuid) = Uuid::parse_str(prefix) {
        return Ok(uuid);
    }

    validate_prefix(prefix)?;

    let rows: Vec<(String,)> = sqlx::query_as(query)
        .bind(owner)
        .bind(format!("{}%", prefix.to_lowercase()))
        .fetch_all(pool)
        .await?;

    match rows.as_slice() {
        [] => bail!("No {entity} found matching '{prefix}'"),
        [(id,)] => Ok(Uuid::parse_str(id)?),
        _ => {
            let mut msg = format!("Ambiguous prefix '{prefix}': matches {} {entity}s:", rows.len());
            for (id,) in &rows {
                msg.push_str(&format!("\n  {id}"));
            }
            bail!("{msg}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;

    async fn insert_lesson(pool: &SqlitePool, id: &str, owner: &str) {
        sqlx::query(
            "INSERT INTO lessons (id, owner, title, description, slide_count, estimated_duration_minutes, document, created_at, updated_at)
             VALUES (?, ?, 't', 'd', 0, 15, '{}', '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
        )
        .bind(id)
        .bind(owner)
        .execute(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_resolve_unique_and_ambiguous_prefix() {
        let pool = create_migrated_test_pool().await.unwrap();
        insert_lesson(&pool, "aaaa1111-0000-4000-8000-000000000001", "alice").await;
        insert_lesson(&pool, "aaaa2222-0000-4000-8000-000000000002", "alice").await;
        insert_lesson(&pool, "bbbb1111-0000-4000-8000-000000000003", "bob").await;

        let id = resolve_lesson_id(&pool, "alice", "aaaa1").await.unwrap();
        assert_eq!(id.to_string(), "aaaa1111-0000-4000-8000-000000000001");

        let err = resolve_lesson_id(&pool, "alice", "aaaa").await.unwrap_err();
        assert!(err.to_string().contains("Ambiguous prefix"));

        assert!(resolve_lesson_id(&pool, "alice", "bbbb").await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_prefix_rejected() {
        let pool = create_migrated_test_pool().await.unwrap();
        assert!(resolve_investigation_id(&pool, "alice", "xyz!").await.is_err());
        assert!(resolve_investigation_id(&pool, "alice", "").await.is_err());
    }
}
