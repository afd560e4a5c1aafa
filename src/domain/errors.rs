//! Domain errors for the sleuth investigation engine.

use thiserror::Error;
use uuid::Uuid;

use crate::domain::models::InvestigationState;

/// Domain-level errors that can occur while synthesizing, running, or storing investigations.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Investigation not found: {0}")]
    InvestigationNotFound(Uuid),

    #[error("Lesson not found: {0}")]
    LessonNotFound(Uuid),

    #[error("Interactive investigation slide {slide_id} not found in lesson {lesson_id}")]
    SlideNotFound { lesson_id: Uuid, slide_id: String },

    #[error("Failed to parse oracle output: {0}")]
    ParseError(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Reasoning oracle unavailable: {0}")]
    OracleUnavailable(String),

    #[error("Reasoning oracle rejected the request: {0}")]
    OracleRejected(String),

    #[error("Investigation {id} is closed ({state}); no further messages are accepted")]
    InvestigationClosed { id: String, state: InvestigationState },

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        from: InvestigationState,
        to: InvestigationState,
    },

    #[error("Concurrency conflict: {entity} {id} was modified")]
    ConcurrencyConflict { entity: String, id: String },

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl DomainError {
    /// Whether the error is caused by the request rather than by the system.
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvestigationNotFound(_)
                | Self::LessonNotFound(_)
                | Self::SlideNotFound { .. }
                | Self::ValidationFailed(_)
                | Self::InvestigationClosed { .. }
        )
    }

    /// Whether the error came from the reasoning oracle.
    pub const fn is_oracle_failure(&self) -> bool {
        matches!(self, Self::OracleUnavailable(_) | Self::OracleRejected(_))
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
