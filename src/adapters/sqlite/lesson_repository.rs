//! SQLite implementation of the LessonRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{format_datetime, parse_datetime, parse_uuid, to_i64};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Lesson, LessonSummary};
use crate::domain::ports::LessonRepository;

#[derive(Clone)]
pub struct SqliteLessonRepository {
    pool: SqlitePool,
}

impl SqliteLessonRepository {
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LessonRepository for SqliteLessonRepository {
    async fn create(&self, lesson: &Lesson) -> DomainResult<()> {
        let document = serde_json::to_string(lesson)?;

        sqlx::query(
            r#"INSERT INTO lessons (id, owner, title, description, slide_count, estimated_duration_minutes, document, version, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?, ?)"#,
        )
        .bind(lesson.id.to_string())
        .bind(&lesson.owner)
        .bind(&lesson.title)
        .bind(&lesson.description)
        .bind(to_i64(lesson.slides.len()))
        .bind(i64::from(lesson.estimated_duration_minutes))
        .bind(&document)
        .bind(format_datetime(&lesson.created_at))
        .bind(format_datetime(&lesson.updated_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid, owner: &str) -> DomainResult<Option<Lesson>> {
        let row: Option<(String, i64)> =
            sqlx::query_as("SELECT document, version FROM lessons WHERE id = ? AND owner = ?")
                .bind(id.to_string())
                .bind(owner)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(document, version)| {
            let mut lesson: Lesson = serde_json::from_str(&document)?;
            lesson.version = version;
            Ok(lesson)
        })
        .transpose()
    }

    async fn update(&self, lesson: &Lesson) -> DomainResult<i64> {
        let document = serde_json::to_string(lesson)?;

        let result = sqlx::query(
            r#"UPDATE lessons SET title = ?, description = ?, slide_count = ?, estimated_duration_minutes = ?,
               document = ?, version = version + 1, updated_at = ?
               WHERE id = ? AND owner = ? AND version = ?"#,
        )
        .bind(&lesson.title)
        .bind(&lesson.description)
        .bind(to_i64(lesson.slides.len()))
        .bind(i64::from(lesson.estimated_duration_minutes))
        .bind(&document)
        .bind(format_datetime(&lesson.updated_at))
        .bind(lesson.id.to_string())
        .bind(&lesson.owner)
        .bind(lesson.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let exists: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM lessons WHERE id = ? AND owner = ?")
                .bind(lesson.id.to_string())
                .bind(&lesson.owner)
                .fetch_optional(&self.pool)
                .await?;

            return Err(match exists {
                None => DomainError::LessonNotFound(lesson.id),
                Some(_) => DomainError::ConcurrencyConflict {
                    entity: "lesson".to_string(),
                    id: lesson.id.to_string(),
                },
            });
        }

        Ok(lesson.version + 1)
    }

    async fn list_by_owner(&self, owner: &str) -> DomainResult<Vec<LessonSummary>> {
        let rows: Vec<SummaryRow> = sqlx::query_as(
            r#"SELECT id, title, description, slide_count, estimated_duration_minutes, created_at
               FROM lessons WHERE owner = ? ORDER BY created_at DESC, rowid DESC"#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn delete(&self, id: Uuid, owner: &str) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM lessons WHERE id = ? AND owner = ?")
            .bind(id.to_string())
            .bind(owner)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::LessonNotFound(id));
        }

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: String,
    title: String,
    description: String,
    slide_count: i64,
    estimated_duration_minutes: i64,
    created_at: String,
}

impl TryFrom<SummaryRow> for LessonSummary {
    type Error = DomainError;

    fn try_from(row: SummaryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&row.id)?,
            title: row.title,
            description: row.description,
            slide_count: usize::try_from(row.slide_count)
                .map_err(|e| DomainError::SerializationError(e.to_string()))?,
            estimated_duration_minutes: u32::try_from(row.estimated_duration_minutes)
                .map_err(|e| DomainError::SerializationError(e.to_string()))?,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}
