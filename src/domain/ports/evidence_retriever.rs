//! Evidence retrieval port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{EvidenceSource, Snippet};

/// Ranked search over one of the team's knowledge sources.
///
/// Indexing and embedding live outside this crate; implementations only
/// answer queries.
#[async_trait]
pub trait EvidenceRetriever: Send + Sync {
    /// Up to `k` snippets, best first. An empty vec means no results.
    async fn search(&self, source: EvidenceSource, query: &str, k: usize) -> DomainResult<Vec<Snippet>>;
}
