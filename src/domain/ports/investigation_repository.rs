//! Investigation session store port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{InvestigationSession, InvestigationSummary};

/// Repository interface for standalone investigation sessions.
///
/// Every lookup is scoped by owner; a session owned by someone else is
/// indistinguishable from a missing one.
#[async_trait]
pub trait InvestigationRepository: Send + Sync {
    /// Persist a new session and return its id.
    async fn create(&self, session: &InvestigationSession) -> DomainResult<Uuid>;

    /// Get a session by id for its owner.
    async fn get(&self, id: Uuid, owner: &str) -> DomainResult<Option<InvestigationSession>>;

    /// Replace the stored document.
    ///
    /// `session.version` must be the version that was read; the stored
    /// version is bumped and returned. A stale version yields
    /// `ConcurrencyConflict`.
    async fn update(&self, session: &InvestigationSession) -> DomainResult<i64>;

    /// Summaries of the owner's sessions, newest first.
    async fn list_by_owner(&self, owner: &str) -> DomainResult<Vec<InvestigationSummary>>;

    /// Delete a session.
    async fn delete(&self, id: Uuid, owner: &str) -> DomainResult<()>;
}
