//! Problem synthesis: turn the team's history into one investigation.
//!
//! A single oracle request does the whole job. The oracle gets the retrieval
//! tools (wrapped in an [`EvidenceToolbox`] that enforces the call budget),
//! picks a past issue, and answers with a JSON object that is validated here
//! before anything is persisted.

use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

use super::evidence_toolbox::EvidenceToolbox;
use super::prompts::synthesis_prompt;
use super::{complete_within, extract_json_from_response};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{InvestigationConfig, InvestigationVariant, SynthesizedProblem};
use crate::domain::ports::{EvidenceRetriever, OraclePurpose, OracleRequest, ReasoningOracle};

#[derive(Debug, Clone)]
pub struct SynthesisConfig {
    pub tool_call_budget: u32,
    pub search_k: usize,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self::from(&InvestigationConfig::default())
    }
}

impl From<&InvestigationConfig> for SynthesisConfig {
    fn from(config: &InvestigationConfig) -> Self {
        Self {
            tool_call_budget: config.tool_call_budget,
            search_k: config.search_k,
            temperature: config.temperature,
            timeout: Duration::from_secs(config.oracle_timeout_secs),
        }
    }
}

pub struct ProblemSynthesizer {
    oracle: Arc<dyn ReasoningOracle>,
    retriever: Arc<dyn EvidenceRetriever>,
    config: SynthesisConfig,
}

impl ProblemSynthesizer {
    pub fn new(oracle: Arc<dyn ReasoningOracle>, retriever: Arc<dyn EvidenceRetriever>, config: SynthesisConfig) -> Self {
        Self {
            oracle,
            retriever,
            config,
        }
    }

    /// Generate and validate one problem. Nothing is retried on failure.
    pub async fn synthesize(&self, topic: Option<&str>, variant: InvestigationVariant) -> DomainResult<SynthesizedProblem> {
        let toolbox = Arc::new(EvidenceToolbox::new(
            self.retriever.clone(),
            self.config.tool_call_budget,
            self.config.search_k,
        ));
        let prompt = synthesis_prompt(topic, variant, self.config.tool_call_budget);
        let request = OracleRequest::new(OraclePurpose::Synthesis, prompt)
            .with_temperature(self.config.temperature)
            .with_tools(toolbox.clone());

        tracing::info!(topic = topic.unwrap_or("-"), variant = variant.as_str(), oracle = self.oracle.name(), "synthesizing investigation");
        let response = complete_within(self.oracle.as_ref(), request, self.config.timeout).await?;

        let problem = parse_problem(&response, variant).inspect_err(|e| {
            tracing::error!(error = %e, "synthesized problem rejected");
        })?;

        tracing::info!(title = %problem.title, searches = toolbox.calls_made(), "investigation synthesized");
        Ok(problem)
    }
}

fn required_str(object: &Map<String, Value>, field: &str) -> DomainResult<String> {
    match object.get(field) {
        None | Some(Value::Null) => Err(DomainError::ValidationFailed(format!("Missing required field: {field}"))),
        Some(Value::String(s)) if s.trim().is_empty() => {
            Err(DomainError::ValidationFailed(format!("Field '{field}' must not be empty")))
        }
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(_) => Err(DomainError::ValidationFailed(format!("Field '{field}' must be a string"))),
    }
}

fn hints(object: &Map<String, Value>) -> DomainResult<Vec<String>> {
    match object.get("hints") {
        None => Err(DomainError::ValidationFailed("Missing required field: hints".to_string())),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(|s| s.trim().to_string())
                    .ok_or_else(|| DomainError::ValidationFailed("Field 'hints' must contain only strings".to_string()))
            })
            .filter(|h| !matches!(h, Ok(s) if s.is_empty()))
            .collect(),
        Some(_) => Err(DomainError::ValidationFailed("Field 'hints' must be an array".to_string())),
    }
}

/// Parse the oracle's final text into a problem for the given variant.
///
/// `ParseError` when the text is not a JSON object once code fences are
/// removed; `ValidationFailed` when a required field is missing or the
/// description gives the solution away.
pub fn parse_problem(response: &str, variant: InvestigationVariant) -> DomainResult<SynthesizedProblem> {
    let json = extract_json_from_response(response);
    let value: Value = serde_json::from_str(&json)
        .map_err(|e| DomainError::ParseError(format!("Failed to parse problem response as JSON: {e}")))?;
    let Value::Object(object) = value else {
        return Err(DomainError::ParseError("Problem response is not a JSON object".to_string()));
    };

    let (description_key, context_key) = match variant {
        InvestigationVariant::Standalone => ("description", "context"),
        InvestigationVariant::Slide => ("problem_description", "problem_context"),
    };

    let problem = SynthesizedProblem {
        title: required_str(&object, "title")?,
        problem_description: required_str(&object, description_key)?,
        problem_context: required_str(&object, context_key)?,
        solution: required_str(&object, "solution")?,
        hints: match variant {
            InvestigationVariant::Standalone => Vec::new(),
            InvestigationVariant::Slide => hints(&object)?,
        },
    };

    if let Some(summary) = object.get("search_summary").and_then(Value::as_str) {
        tracing::debug!(search_summary = summary, "synthesis search summary");
    }

    if problem.problem_description.contains(&problem.solution) {
        return Err(DomainError::ValidationFailed(
            "Problem description reveals the solution".to_string(),
        ));
    }

    Ok(problem)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STANDALONE: &str = r#"{
        "title": "Flaky login",
        "description": "Users are logged out at random.",
        "context": "Sessions live in Redis.",
        "solution": "Redis maxmemory evicted session keys; the policy was changed to volatile-lru."
    }"#;

    #[test]
    fn test_parse_standalone_shape() {
        let problem = parse_problem(STANDALONE, InvestigationVariant::Standalone).unwrap();
        assert_eq!(problem.title, "Flaky login");
        assert_eq!(problem.problem_context, "Sessions live in Redis.");
        assert!(problem.hints.is_empty());
    }

    #[test]
    fn test_parse_strips_code_fences() {
        let fenced = format!("```json\n{STANDALONE}\n```");
        assert!(parse_problem(&fenced, InvestigationVariant::Standalone).is_ok());

        let bare_fence = format!("```\n{STANDALONE}\n```");
        assert!(parse_problem(&bare_fence, InvestigationVariant::Standalone).is_ok());
    }

    #[test]
    fn test_parse_slide_shape_requires_hints() {
        let slide = r#"{"title": "t", "problem_description": "d", "problem_context": "c", "solution": "s",
                        "hints": ["first", "", "second"]}"#;
        let problem = parse_problem(slide, InvestigationVariant::Slide).unwrap();
        assert_eq!(problem.hints, vec!["first", "second"]);

        let err = parse_problem(STANDALONE, InvestigationVariant::Slide).unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed(msg) if msg.contains("problem_description")));
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = parse_problem("Here is your problem: title Flaky login", InvestigationVariant::Standalone).unwrap_err();
        assert!(matches!(err, DomainError::ParseError(_)));

        let err = parse_problem("[1, 2]", InvestigationVariant::Standalone).unwrap_err();
        assert!(matches!(err, DomainError::ParseError(_)));
    }

    #[test]
    fn test_missing_field_is_validation_error() {
        let json = r#"{"title": "t", "description": "d", "context": "c"}"#;
        let err = parse_problem(json, InvestigationVariant::Standalone).unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed(msg) if msg == "Missing required field: solution"));
    }

    #[test]
    fn test_description_leaking_solution_rejected() {
        let json = r#"{"title": "t", "description": "Logins fail. Cause: bad TTL", "context": "c", "solution": "bad TTL"}"#;
        let err = parse_problem(json, InvestigationVariant::Standalone).unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed(_)));
    }
}
