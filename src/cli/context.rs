//! Per-process wiring for CLI commands.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::adapters::oracle::{AnthropicOracle, AnthropicOracleConfig};
use crate::adapters::sqlite::{initialize_from_config, SqliteInvestigationRepository, SqliteLessonRepository};
use crate::domain::models::Config;
use crate::domain::ports::{NullEvidenceRetriever, ReasoningOracle};
use crate::services::InvestigationService;

pub type SqliteInvestigationService = InvestigationService<SqliteInvestigationRepository, SqliteLessonRepository>;

/// Everything a command needs, built once per invocation and passed down.
pub struct AppContext {
    pub config: Config,
    pub owner: String,
    pub pool: SqlitePool,
    pub service: SqliteInvestigationService,
}

impl AppContext {
    pub async fn new(config: Config, owner: String) -> Result<Self> {
        let pool = initialize_from_config(&config.database)
            .await
            .context("Failed to open database. Run 'sleuth init' first.")?;

        let oracle: Arc<dyn ReasoningOracle> = Arc::new(
            AnthropicOracle::new(AnthropicOracleConfig::from_config(&config))
                .context("Failed to create reasoning oracle")?,
        );

        Ok(Self::with_oracle(config, owner, pool, oracle))
    }

    /// Build around an existing pool and oracle.
    pub fn with_oracle(config: Config, owner: String, pool: SqlitePool, oracle: Arc<dyn ReasoningOracle>) -> Self {
        let service = InvestigationService::from_config(
            Arc::new(SqliteInvestigationRepository::new(pool.clone())),
            Arc::new(SqliteLessonRepository::new(pool.clone())),
            oracle,
            Arc::new(NullEvidenceRetriever::new()),
            &config.investigation,
        );

        Self {
            config,
            owner,
            pool,
            service,
        }
    }
}
