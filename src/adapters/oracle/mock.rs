//! Scripted oracle for tests.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::sync::RwLock;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ToolCall, ToolOutput};
use crate::domain::ports::{OraclePurpose, OracleRequest, ReasoningOracle};

pub const SAMPLE_TITLE: &str = "Checkout fails for legacy accounts";
pub const SAMPLE_DESCRIPTION: &str = "Since Tuesday's deploy a subset of customers get a 500 error when they click Pay. \
New accounts are unaffected and the error rate holds steady at about 3% of checkouts.";
pub const SAMPLE_CONTEXT: &str = "Sentry: NullPointerException in PaymentService.buildCharge line 88. \
Ticket PAY-412: the deploy added multi-currency support. \
Slack #payments: 'only accounts created before 2019 seem to hit it'.";
pub const SAMPLE_SOLUTION: &str = "Accounts created before 2019 have a null currency column. \
The multi-currency change in PaymentService.buildCharge dereferenced account.currency without a fallback, \
which threw a NullPointerException. The fix backfilled the column with USD and added a default currency.";

/// Synthesis output carrying the fields of both the standalone and slide shapes.
pub fn sample_problem_json() -> String {
    serde_json::json!({
        "title": SAMPLE_TITLE,
        "description": SAMPLE_DESCRIPTION,
        "context": SAMPLE_CONTEXT,
        "problem_description": SAMPLE_DESCRIPTION,
        "problem_context": SAMPLE_CONTEXT,
        "solution": SAMPLE_SOLUTION,
        "hints": [
            "Compare the accounts that fail with the ones that succeed.",
            "Look at what the deploy changed in buildCharge."
        ],
        "search_summary": "Searched tickets for 500 errors and Slack for payment incidents."
    })
    .to_string()
}

/// What the mock does for one request.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    /// Fails with `OracleUnavailable`
    Unavailable(String),
    /// Fails with `OracleRejected`
    Rejected(String),
    /// Sleeps, then answers; for exercising timeouts
    Stall(Duration, String),
}

impl MockReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn unavailable() -> Self {
        Self::Unavailable("simulated outage".to_string())
    }
}

/// A request as the mock saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub purpose: OraclePurpose,
    pub prompt: String,
    pub temperature: Option<f32>,
    pub offered_tools: Vec<String>,
    pub tool_outputs: Vec<ToolOutput>,
}

/// Oracle double with per-purpose reply queues.
///
/// Queued replies are consumed first; when a queue is empty the purpose's
/// default applies (a valid problem for synthesis, `INCORRECT` for grading,
/// a generic nudge for coaching). Scripted tool calls are made against the
/// request's tools on every synthesis request.
pub struct MockOracle {
    queued: RwLock<HashMap<OraclePurpose, VecDeque<MockReply>>>,
    defaults: HashMap<OraclePurpose, MockReply>,
    tool_calls: Vec<ToolCall>,
    recorded: RwLock<Vec<RecordedRequest>>,
}

impl MockOracle {
    pub fn new() -> Self {
        let defaults = HashMap::from([
            (OraclePurpose::Synthesis, MockReply::Text(sample_problem_json())),
            (OraclePurpose::Grading, MockReply::text("INCORRECT")),
            (
                OraclePurpose::Coaching,
                MockReply::text("Good start. What does the Sentry trace tell you about which field was null?"),
            ),
        ]);

        Self {
            queued: RwLock::new(HashMap::new()),
            defaults,
            tool_calls: Vec::new(),
            recorded: RwLock::new(Vec::new()),
        }
    }

    /// Replace the fallback reply for a purpose.
    #[must_use]
    pub fn with_default(mut self, purpose: OraclePurpose, reply: MockReply) -> Self {
        self.defaults.insert(purpose, reply);
        self
    }

    /// Queue a one-shot reply.
    #[must_use]
    pub fn with_reply(mut self, purpose: OraclePurpose, reply: MockReply) -> Self {
        self.queued.get_mut().entry(purpose).or_default().push_back(reply);
        self
    }

    /// Tool calls to make during synthesis, in order.
    #[must_use]
    pub fn with_tool_calls(mut self, calls: Vec<ToolCall>) -> Self {
        self.tool_calls = calls;
        self
    }

    pub async fn push_reply(&self, purpose: OraclePurpose, reply: MockReply) {
        let mut queued = self.queued.write().await;
        queued.entry(purpose).or_default().push_back(reply);
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.recorded.read().await.clone()
    }

    pub async fn requests_for(&self, purpose: OraclePurpose) -> Vec<RecordedRequest> {
        self.recorded
            .read()
            .await
            .iter()
            .filter(|r| r.purpose == purpose)
            .cloned()
            .collect()
    }

    pub async fn call_count(&self, purpose: OraclePurpose) -> usize {
        self.requests_for(purpose).await.len()
    }

    async fn next_reply(&self, purpose: OraclePurpose) -> MockReply {
        let mut queued = self.queued.write().await;
        queued
            .get_mut(&purpose)
            .and_then(VecDeque::pop_front)
            .or_else(|| self.defaults.get(&purpose).cloned())
            .unwrap_or_else(|| MockReply::Rejected(format!("no reply scripted for {}", purpose.as_str())))
    }
}

impl Default for MockOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReasoningOracle for MockOracle {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn complete(&self, request: OracleRequest) -> DomainResult<String> {
        let mut tool_outputs = Vec::new();
        let offered_tools = request
            .tools
            .as_ref()
            .map(|t| t.specs().into_iter().map(|s| s.name).collect())
            .unwrap_or_default();

        if request.purpose == OraclePurpose::Synthesis {
            if let Some(tools) = &request.tools {
                for call in &self.tool_calls {
                    tool_outputs.push(tools.invoke(call).await);
                }
            }
        }

        self.recorded.write().await.push(RecordedRequest {
            purpose: request.purpose,
            prompt: request.prompt.clone(),
            temperature: request.temperature,
            offered_tools,
            tool_outputs,
        });

        match self.next_reply(request.purpose).await {
            MockReply::Text(text) => Ok(text),
            MockReply::Unavailable(reason) => Err(DomainError::OracleUnavailable(reason)),
            MockReply::Rejected(reason) => Err(DomainError::OracleRejected(reason)),
            MockReply::Stall(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_queued_replies_then_default() {
        let oracle = MockOracle::new().with_reply(OraclePurpose::Grading, MockReply::text("CORRECT"));

        let first = oracle.complete(OracleRequest::new(OraclePurpose::Grading, "p")).await.unwrap();
        let second = oracle.complete(OracleRequest::new(OraclePurpose::Grading, "p")).await.unwrap();

        assert_eq!(first, "CORRECT");
        assert_eq!(second, "INCORRECT");
        assert_eq!(oracle.call_count(OraclePurpose::Grading).await, 2);
    }

    #[tokio::test]
    async fn test_unavailable_reply() {
        let oracle = MockOracle::new().with_reply(OraclePurpose::Coaching, MockReply::unavailable());
        let result = oracle.complete(OracleRequest::new(OraclePurpose::Coaching, "p")).await;
        assert!(matches!(result, Err(DomainError::OracleUnavailable(_))));
    }

    #[test]
    fn test_sample_solution_not_in_description() {
        assert!(!SAMPLE_DESCRIPTION.contains(SAMPLE_SOLUTION));
    }
}
