//! SQLite implementation of the InvestigationRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{format_datetime, parse_datetime, parse_optional_datetime, parse_uuid, to_i64};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{InvestigationSession, InvestigationState, InvestigationSummary};
use crate::domain::ports::InvestigationRepository;

#[derive(Clone)]
pub struct SqliteInvestigationRepository {
    pool: SqlitePool,
}

impl SqliteInvestigationRepository {
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn stored_version(&self, id: Uuid, owner: &str) -> DomainResult<Option<i64>> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT version FROM investigations WHERE id = ? AND owner = ?")
            .bind(id.to_string())
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(v,)| v))
    }
}

#[async_trait]
impl InvestigationRepository for SqliteInvestigationRepository {
    async fn create(&self, session: &InvestigationSession) -> DomainResult<Uuid> {
        let document = serde_json::to_string(session)?;
        let inv = &session.investigation;

        sqlx::query(
            r#"INSERT INTO investigations (id, owner, title, current_state, hints_given, turns, document, version, created_at, updated_at, completed_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?, ?, ?)"#,
        )
        .bind(session.id.to_string())
        .bind(&session.owner)
        .bind(&inv.title)
        .bind(inv.current_state.as_str())
        .bind(i64::from(inv.hints_given))
        .bind(to_i64(inv.chat_history.len() / 2))
        .bind(&document)
        .bind(format_datetime(&inv.created_at))
        .bind(format_datetime(&session.updated_at))
        .bind(inv.completed_at.as_ref().map(format_datetime))
        .execute(&self.pool)
        .await?;

        Ok(session.id)
    }

    async fn get(&self, id: Uuid, owner: &str) -> DomainResult<Option<InvestigationSession>> {
        let row: Option<DocumentRow> =
            sqlx::query_as("SELECT document, version FROM investigations WHERE id = ? AND owner = ?")
                .bind(id.to_string())
                .bind(owner)
                .fetch_optional(&self.pool)
                .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn update(&self, session: &InvestigationSession) -> DomainResult<i64> {
        let document = serde_json::to_string(session)?;
        let inv = &session.investigation;

        let result = sqlx::query(
            r#"UPDATE investigations SET title = ?, current_state = ?, hints_given = ?, turns = ?,
               document = ?, version = version + 1, updated_at = ?, completed_at = ?
               WHERE id = ? AND owner = ? AND version = ?"#,
        )
        .bind(&inv.title)
        .bind(inv.current_state.as_str())
        .bind(i64::from(inv.hints_given))
        .bind(to_i64(inv.chat_history.len() / 2))
        .bind(&document)
        .bind(format_datetime(&session.updated_at))
        .bind(inv.completed_at.as_ref().map(format_datetime))
        .bind(session.id.to_string())
        .bind(&session.owner)
        .bind(session.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return match self.stored_version(session.id, &session.owner).await? {
                None => Err(DomainError::InvestigationNotFound(session.id)),
                Some(_) => Err(DomainError::ConcurrencyConflict {
                    entity: "investigation".to_string(),
                    id: session.id.to_string(),
                }),
            };
        }

        Ok(session.version + 1)
    }

    async fn list_by_owner(&self, owner: &str) -> DomainResult<Vec<InvestigationSummary>> {
        let rows: Vec<SummaryRow> = sqlx::query_as(
            r#"SELECT id, title, current_state, hints_given, turns, created_at, completed_at
               FROM investigations WHERE owner = ? ORDER BY created_at DESC, rowid DESC"#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn delete(&self, id: Uuid, owner: &str) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM investigations WHERE id = ? AND owner = ?")
            .bind(id.to_string())
            .bind(owner)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::InvestigationNotFound(id));
        }

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct DocumentRow {
    document: String,
    version: i64,
}

impl TryFrom<DocumentRow> for InvestigationSession {
    type Error = DomainError;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        let mut session: Self = serde_json::from_str(&row.document)?;
        session.version = row.version;
        Ok(session)
    }
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: String,
    title: String,
    current_state: String,
    hints_given: i64,
    turns: i64,
    created_at: String,
    completed_at: Option<String>,
}

impl TryFrom<SummaryRow> for InvestigationSummary {
    type Error = DomainError;

    fn try_from(row: SummaryRow) -> Result<Self, Self::Error> {
        let current_state = InvestigationState::from_str(&row.current_state)
            .ok_or_else(|| DomainError::SerializationError(format!("Invalid state: {}", row.current_state)))?;

        Ok(Self {
            id: parse_uuid(&row.id)?,
            title: row.title,
            current_state,
            hints_given: u32::try_from(row.hints_given)
                .map_err(|e| DomainError::SerializationError(e.to_string()))?,
            turns: usize::try_from(row.turns).map_err(|e| DomainError::SerializationError(e.to_string()))?,
            created_at: parse_datetime(&row.created_at)?,
            completed_at: parse_optional_datetime(row.completed_at)?,
        })
    }
}
