//! Evidence retrieval and tool-calling types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Team knowledge source an investigation can draw evidence from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceSource {
    Codebase,
    IssueTracker,
    ChatHistory,
}

impl EvidenceSource {
    pub const ALL: [Self; 3] = [Self::Codebase, Self::IssueTracker, Self::ChatHistory];

    /// Name of the retrieval tool the oracle calls for this source.
    pub const fn tool_name(&self) -> &'static str {
        match self {
            Self::Codebase => "search_codebase",
            Self::IssueTracker => "search_linear_ticket",
            Self::ChatHistory => "search_slack_messages",
        }
    }

    pub fn from_tool_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|source| source.tool_name() == name)
    }

    pub const fn description(&self) -> &'static str {
        match self {
            Self::Codebase => {
                "Search the team's codebase for relevant code snippets, functions, and files."
            }
            Self::IssueTracker => {
                "Search the team's issue tracker for tickets describing bugs, incidents, and their resolutions."
            }
            Self::ChatHistory => {
                "Search the team's chat history for discussions about incidents and debugging sessions."
            }
        }
    }
}

/// One ranked retrieval hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    pub source: EvidenceSource,
    /// File path, ticket key, or channel, depending on the source
    pub location: String,
    pub content: String,
    #[serde(default)]
    pub score: Option<f32>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// A tool the oracle may call while reasoning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// A tool invocation requested by the oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    pub input: serde_json::Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, input: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            input,
        }
    }
}

/// Text handed back to the oracle for a tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub content: String,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn ok(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_name_round_trip() {
        for source in EvidenceSource::ALL {
            assert_eq!(EvidenceSource::from_tool_name(source.tool_name()), Some(source));
        }
        assert_eq!(EvidenceSource::from_tool_name("search_web"), None);
    }
}
