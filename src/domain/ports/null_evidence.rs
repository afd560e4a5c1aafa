//! Null evidence retriever.
//!
//! Used when no retrieval backend is wired up; every search comes back empty
//! and the oracle has to work from the prompt alone.

use async_trait::async_trait;

use super::EvidenceRetriever;
use crate::domain::errors::DomainResult;
use crate::domain::models::{EvidenceSource, Snippet};

#[derive(Debug, Clone, Default)]
pub struct NullEvidenceRetriever;

impl NullEvidenceRetriever {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EvidenceRetriever for NullEvidenceRetriever {
    async fn search(&self, _source: EvidenceSource, _query: &str, _k: usize) -> DomainResult<Vec<Snippet>> {
        Ok(Vec::new())
    }
}
