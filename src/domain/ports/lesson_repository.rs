//! Lesson store port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Lesson, LessonSummary};

/// Repository interface for lesson documents.
#[async_trait]
pub trait LessonRepository: Send + Sync {
    /// Persist a new lesson.
    async fn create(&self, lesson: &Lesson) -> DomainResult<()>;

    /// Get a lesson by id for its owner.
    async fn get(&self, id: Uuid, owner: &str) -> DomainResult<Option<Lesson>>;

    /// Replace the stored document; same versioning contract as
    /// [`super::InvestigationRepository::update`].
    async fn update(&self, lesson: &Lesson) -> DomainResult<i64>;

    /// Summaries of the owner's lessons, newest first.
    async fn list_by_owner(&self, owner: &str) -> DomainResult<Vec<LessonSummary>>;

    /// Delete a lesson together with its embedded slides.
    async fn delete(&self, id: Uuid, owner: &str) -> DomainResult<()>;
}
