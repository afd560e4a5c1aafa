//! Sleuth - interactive incident investigations
//!
//! Sleuth turns a team's past incidents into puzzles. A reasoning oracle digs
//! through code, tickets and chat history to reconstruct one resolved issue,
//! hides the root cause, and then coaches a learner through it turn by turn
//! until they explain the cause and fix or give up.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, errors, and port traits
//! - **Service Layer** (`services`): synthesis, grading, dialogue, orchestration
//! - **Adapters** (`adapters`): SQLite stores and reasoning oracles
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sleuth::adapters::oracle::MockOracle;
//! use sleuth::adapters::sqlite::{create_migrated_test_pool, SqliteInvestigationRepository, SqliteLessonRepository};
//! use sleuth::domain::models::InvestigationConfig;
//! use sleuth::domain::ports::NullEvidenceRetriever;
//! use sleuth::services::InvestigationService;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = create_migrated_test_pool().await?;
//!     let service = InvestigationService::from_config(
//!         Arc::new(SqliteInvestigationRepository::new(pool.clone())),
//!         Arc::new(SqliteLessonRepository::new(pool)),
//!         Arc::new(MockOracle::new()),
//!         Arc::new(NullEvidenceRetriever::new()),
//!         &InvestigationConfig::default(),
//!     );
//!     let view = service.start_investigation("dev@example.com", Some("null pointer bug")).await?;
//!     let turn = service.post_message("dev@example.com", view.id.parse()?, "What error are we seeing?").await?;
//!     println!("{}", turn.reply);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    Config, Investigation, InvestigationSession, InvestigationState, InvestigationVariant, InvestigationView,
    Lesson, Slide, TurnReply,
};
pub use domain::ports::{
    EvidenceRetriever, InvestigationRepository, LessonRepository, ReasoningOracle,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::InvestigationService;
