//! Common test utilities for integration tests
//!
//! Builds an investigation service over an in-memory migrated SQLite pool and
//! a scripted oracle.

use std::sync::Arc;

use sleuth::adapters::oracle::MockOracle;
use sleuth::adapters::sqlite::{create_migrated_test_pool, SqliteInvestigationRepository, SqliteLessonRepository};
use sleuth::domain::models::InvestigationConfig;
use sleuth::domain::ports::NullEvidenceRetriever;
use sleuth::services::InvestigationService;
use sqlx::SqlitePool;

#[allow(dead_code)]
pub const OWNER: &str = "dev@example.com";

/// An explanation long enough, and with enough sentences, to reach the grader.
#[allow(dead_code)]
pub const FULL_ANSWER: &str = "The root cause was a null currency column on accounts created before 2019. \
    The multi-currency deploy changed buildCharge to read account.currency directly, so those legacy rows \
    threw a NullPointerException whenever the customer clicked Pay. That is why only old accounts failed and \
    why the error rate stayed flat. The team fixed it by backfilling the column with USD and adding a default \
    currency in the code path so that a missing value can never reach the charge builder again.";

pub type TestService = InvestigationService<SqliteInvestigationRepository, SqliteLessonRepository>;

#[allow(dead_code)]
pub struct Harness {
    pub service: Arc<TestService>,
    pub oracle: Arc<MockOracle>,
    pub pool: SqlitePool,
}

/// Setup test logging
///
/// Call this at the beginning of tests that need logging.
#[allow(dead_code)]
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Create a migrated in-memory pool.
#[allow(dead_code)]
pub async fn setup_test_pool() -> SqlitePool {
    create_migrated_test_pool()
        .await
        .expect("Failed to create migrated test pool")
}

#[allow(dead_code)]
pub async fn harness(oracle: MockOracle) -> Harness {
    setup_test_logging();
    let pool = setup_test_pool().await;
    let oracle = Arc::new(oracle);

    let service = InvestigationService::from_config(
        Arc::new(SqliteInvestigationRepository::new(pool.clone())),
        Arc::new(SqliteLessonRepository::new(pool.clone())),
        oracle.clone(),
        Arc::new(NullEvidenceRetriever::new()),
        &InvestigationConfig::default(),
    );

    Harness {
        service: Arc::new(service),
        oracle,
        pool,
    }
}
