//! Retrieval tools offered to the oracle during synthesis.
//!
//! The toolbox owns the call budget. Once `budget` searches have been made,
//! every further call returns a hard-stop message instead of results, no
//! matter what the oracle was told in its prompt.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::domain::models::{EvidenceSource, Snippet, ToolCall, ToolOutput, ToolSpec};
use crate::domain::ports::{EvidenceRetriever, ToolInvoker};

const PREVIEW_CHARS: usize = 500;
const MAX_K: u64 = 20;

pub struct EvidenceToolbox {
    retriever: Arc<dyn EvidenceRetriever>,
    budget: u32,
    default_k: usize,
    calls: AtomicU32,
}

impl EvidenceToolbox {
    pub fn new(retriever: Arc<dyn EvidenceRetriever>, budget: u32, default_k: usize) -> Self {
        Self {
            retriever,
            budget,
            default_k: default_k.max(1),
            calls: AtomicU32::new(0),
        }
    }

    /// Searches made so far.
    pub fn calls_made(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn remaining(&self) -> u32 {
        self.budget.saturating_sub(self.calls_made())
    }

    /// Reserve one search; false once the budget is spent.
    fn try_consume(&self) -> bool {
        self.calls
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| (n < self.budget).then_some(n + 1))
            .is_ok()
    }

    fn exhausted_message(&self) -> String {
        format!(
            "TOOL BUDGET EXHAUSTED: all {} searches have been used. Do not call any more tools. \
             Pick the best issue from the evidence you already have and return the final JSON now.",
            self.budget
        )
    }
}

fn tool_spec(source: EvidenceSource) -> ToolSpec {
    ToolSpec {
        name: source.tool_name().to_string(),
        description: source.description().to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query describing what to look for"
                },
                "k": {
                    "type": "integer",
                    "description": "Number of results to return (default 5)",
                    "minimum": 1,
                    "maximum": MAX_K
                }
            },
            "required": ["query"]
        }),
    }
}

/// Truncate to at most `max` characters on a char boundary.
fn preview(content: &str, max: usize) -> String {
    if content.trim().is_empty() {
        return "No content available".to_string();
    }
    match content.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &content[..idx]),
        None => content.to_string(),
    }
}

pub fn format_snippets(snippets: &[Snippet]) -> String {
    let mut out = String::new();
    for (i, snippet) in snippets.iter().enumerate() {
        out.push_str(&format!("Result {}:\n", i + 1));
        out.push_str(&format!("Source: {}\n", snippet.location));
        if let Some(score) = snippet.score {
            out.push_str(&format!("Score: {score:.3}\n"));
        }
        out.push_str(&format!("Content: {}\n\n", preview(&snippet.content, PREVIEW_CHARS)));
    }
    out.trim_end().to_string()
}

#[async_trait]
impl ToolInvoker for EvidenceToolbox {
    fn specs(&self) -> Vec<ToolSpec> {
        EvidenceSource::ALL.into_iter().map(tool_spec).collect()
    }

    async fn invoke(&self, call: &ToolCall) -> ToolOutput {
        let Some(source) = EvidenceSource::from_tool_name(&call.name) else {
            return ToolOutput::error(format!("Unknown tool: {}", call.name));
        };

        let Some(query) = call
            .input
            .get("query")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|q| !q.is_empty())
        else {
            return ToolOutput::error("'query' must be a non-empty string");
        };

        let k = call
            .input
            .get("k")
            .and_then(Value::as_u64)
            .map_or(self.default_k, |k| usize::try_from(k.clamp(1, MAX_K)).unwrap_or(self.default_k));

        if !self.try_consume() {
            tracing::warn!(tool = %call.name, budget = self.budget, "retrieval budget exhausted");
            return ToolOutput::error(self.exhausted_message());
        }

        tracing::debug!(tool = %call.name, query, k, remaining = self.remaining(), "retrieval search");

        match self.retriever.search(source, query, k).await {
            Ok(snippets) if snippets.is_empty() => ToolOutput::ok(format!(
                "No results found for query: '{query}'. Try a different search term or check if the index contains relevant data."
            )),
            Ok(snippets) => ToolOutput::ok(format_snippets(&snippets)),
            Err(e) => {
                tracing::warn!(tool = %call.name, error = %e, "retrieval search failed");
                ToolOutput::error(format!("Error searching {}: {e}", source.tool_name()))
            }
        }
    }
}
