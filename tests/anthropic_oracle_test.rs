//! Anthropic oracle against a mock Messages API.

use async_trait::async_trait;
use mockito::{Matcher, Server};
use serde_json::json;
use sleuth::adapters::oracle::{AnthropicOracle, AnthropicOracleConfig};
use sleuth::domain::models::{RetryConfig, ToolCall, ToolOutput, ToolSpec};
use sleuth::domain::ports::{OraclePurpose, OracleRequest, ReasoningOracle, ToolInvoker};
use sleuth::DomainError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn oracle_for(server: &Server, max_tool_rounds: u32) -> AnthropicOracle {
    AnthropicOracle::new(AnthropicOracleConfig {
        api_key: Some("test-key".to_string()),
        base_url: server.url(),
        max_tool_rounds,
        retry: RetryConfig {
            max_retries: 2,
            initial_backoff_ms: 1,
            max_backoff_ms: 5,
        },
        ..AnthropicOracleConfig::default()
    })
    .expect("oracle builds")
}

fn text_body(text: &str) -> String {
    json!({
        "content": [{"type": "text", "text": text}],
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 12, "output_tokens": 3}
    })
    .to_string()
}

#[tokio::test]
async fn test_text_completion() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/messages")
        .match_header("x-api-key", "test-key")
        .match_header("anthropic-version", "2023-06-01")
        .match_body(Matcher::PartialJson(json!({"temperature": 0.0})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(text_body("CORRECT"))
        .expect(1)
        .create_async()
        .await;

    let oracle = oracle_for(&server, 4);
    let request = OracleRequest::new(OraclePurpose::Grading, "grade this").with_temperature(0.0);
    let text = oracle.complete(request).await.unwrap();

    assert_eq!(text, "CORRECT");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let mut server = Server::new_async().await;
    let failing = server
        .mock("POST", "/v1/messages")
        .with_status(503)
        .with_body("overloaded")
        .expect(1)
        .create_async()
        .await;
    let succeeding = server
        .mock("POST", "/v1/messages")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(text_body("Try comparing old and new accounts."))
        .expect(1)
        .create_async()
        .await;

    let oracle = oracle_for(&server, 4);
    let text = oracle
        .complete(OracleRequest::new(OraclePurpose::Coaching, "coach"))
        .await
        .unwrap();

    assert_eq!(text, "Try comparing old and new accounts.");
    failing.assert_async().await;
    succeeding.assert_async().await;
}

#[tokio::test]
async fn test_unauthorized_is_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/messages")
        .with_status(401)
        .with_body(r#"{"error": {"type": "authentication_error"}}"#)
        .expect(1)
        .create_async()
        .await;

    let oracle = oracle_for(&server, 4);
    let err = oracle
        .complete(OracleRequest::new(OraclePurpose::Coaching, "coach"))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::OracleRejected(_)));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_empty_text_is_unavailable() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/messages")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"content": [], "stop_reason": "end_turn"}).to_string())
        .create_async()
        .await;

    let oracle = oracle_for(&server, 4);
    let err = oracle
        .complete(OracleRequest::new(OraclePurpose::Coaching, "coach"))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::OracleUnavailable(_)));
}

struct CountingTools {
    calls: AtomicUsize,
}

#[async_trait]
impl ToolInvoker for CountingTools {
    fn specs(&self) -> Vec<ToolSpec> {
        vec![ToolSpec {
            name: "search_codebase".to_string(),
            description: "Search code".to_string(),
            input_schema: json!({"type": "object", "properties": {"query": {"type": "string"}}}),
        }]
    }

    async fn invoke(&self, call: &ToolCall) -> ToolOutput {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ToolOutput::ok(format!("results for {}", call.input["query"]))
    }
}

#[tokio::test]
async fn test_tool_loop_forces_answer_after_round_limit() {
    let mut server = Server::new_async().await;
    let tool_round = server
        .mock("POST", "/v1/messages")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "content": [
                    {"type": "text", "text": "Let me look."},
                    {"type": "tool_use", "id": "toolu_1", "name": "search_codebase", "input": {"query": "buildCharge"}}
                ],
                "stop_reason": "tool_use"
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;
    let final_round = server
        .mock("POST", "/v1/messages")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("tool_result".to_string()),
            Matcher::PartialJson(json!({"tool_choice": {"type": "none"}})),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(text_body("{\"title\": \"done\"}"))
        .expect(1)
        .create_async()
        .await;

    let tools = Arc::new(CountingTools {
        calls: AtomicUsize::new(0),
    });
    let oracle = oracle_for(&server, 1);
    let request = OracleRequest::new(OraclePurpose::Synthesis, "find an incident").with_tools(tools.clone());
    let text = oracle.complete(request).await.unwrap();

    assert_eq!(text, "{\"title\": \"done\"}");
    assert_eq!(tools.calls.load(Ordering::SeqCst), 1);
    tool_round.assert_async().await;
    final_round.assert_async().await;
}
