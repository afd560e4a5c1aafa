pub mod dialogue_controller;
pub mod evidence_toolbox;
pub mod hint_policy;
pub mod investigation_service;
pub mod problem_synthesizer;
pub mod prompts;
pub mod session_locks;
pub mod solution_grader;

pub use dialogue_controller::{DialogueConfig, DialogueController};
pub use evidence_toolbox::EvidenceToolbox;
pub use investigation_service::InvestigationService;
pub use problem_synthesizer::{ProblemSynthesizer, SynthesisConfig};
pub use session_locks::SessionLocks;
pub use solution_grader::{GradingPolicy, SolutionGrader, Verdict};

use std::time::Duration;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::{OracleRequest, ReasoningOracle};

/// Extract a JSON object from an oracle reply that may be wrapped in a
/// markdown code fence or surrounded by prose.
pub fn extract_json_from_response(response: &str) -> String {
    let mut trimmed = response.trim();

    if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        let after = after.strip_prefix("json").unwrap_or(after);
        if let Some(end) = after.find("```") {
            trimmed = after[..end].trim();
        }
    }

    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return trimmed.to_string();
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if end > start {
            return trimmed[start..=end].to_string();
        }
    }

    trimmed.to_string()
}

/// Run one oracle request with an upper bound on wall time.
///
/// An elapsed deadline is reported as `OracleUnavailable`.
pub(crate) async fn complete_within(
    oracle: &dyn ReasoningOracle,
    request: OracleRequest,
    timeout: Duration,
) -> DomainResult<String> {
    let purpose = request.purpose;
    match tokio::time::timeout(timeout, oracle.complete(request)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(purpose = purpose.as_str(), timeout_secs = timeout.as_secs_f64(), "oracle call timed out");
            Err(DomainError::OracleUnavailable(format!(
                "{} request timed out after {:?}",
                purpose.as_str(),
                timeout
            )))
        }
    }
}
