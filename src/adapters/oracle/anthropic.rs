//! Anthropic Messages API oracle.
//!
//! Runs the tool-use loop on behalf of the caller: every `tool_use` block in
//! a response is dispatched to the request's [`ToolInvoker`] and the results
//! are sent back until the model answers in plain text. After
//! `max_tool_rounds` the tools stay declared but `tool_choice` is set to
//! `none`, which forces a final answer.

use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::time::Duration;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Config, RateLimitConfig, RetryConfig, ToolCall, ToolSpec};
use crate::domain::ports::{OracleRequest, ReasoningOracle};

/// Configuration for the Anthropic oracle.
#[derive(Debug, Clone)]
pub struct AnthropicOracleConfig {
    /// API key (will be read from ANTHROPIC_API_KEY env if not set).
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub api_version: String,
    pub request_timeout_secs: u64,
    pub max_tokens: u32,
    pub max_tool_rounds: u32,
    pub rate_limit: RateLimitConfig,
    pub retry: RetryConfig,
}

impl Default for AnthropicOracleConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl AnthropicOracleConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            api_key: config.oracle.api_key.clone(),
            base_url: config.oracle.base_url.clone(),
            model: config.oracle.model.clone(),
            api_version: "2023-06-01".to_string(),
            request_timeout_secs: config.oracle.request_timeout_secs,
            max_tokens: config.oracle.max_tokens,
            max_tool_rounds: config.oracle.max_tool_rounds,
            rate_limit: config.rate_limit.clone(),
            retry: config.retry.clone(),
        }
    }

    /// Get API key from config or environment.
    pub fn get_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Content block in a message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    #[serde(rename = "tool_result")]
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
    /// Block types this client does not use (thinking, citations, ...)
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

impl From<&ToolSpec> for ToolDefinition {
    fn from(spec: &ToolSpec) -> Self {
        Self {
            name: spec.name.clone(),
            description: spec.description.clone(),
            input_schema: spec.input_schema.clone(),
        }
    }
}

/// Request to the Anthropic Messages API.
#[derive(Debug, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Response from the Anthropic Messages API.
#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    pub content: Vec<ContentBlock>,
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl MessagesResponse {
    fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn tool_uses(&self) -> Vec<(String, ToolCall)> {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse { id, name, input } => {
                    Some((id.clone(), ToolCall::new(name.clone(), input.clone())))
                }
                _ => None,
            })
            .collect()
    }
}

/// Reasoning oracle backed by the Anthropic Messages API.
pub struct AnthropicOracle {
    config: AnthropicOracleConfig,
    client: Client,
    limiter: DefaultDirectRateLimiter,
}

impl AnthropicOracle {
    pub fn new(config: AnthropicOracleConfig) -> DomainResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| DomainError::ValidationFailed(format!("Failed to create HTTP client: {e}")))?;

        let limiter = RateLimiter::direct(build_quota(&config.rate_limit)?);

        Ok(Self {
            config,
            client,
            limiter,
        })
    }

    fn build_request(
        &self,
        messages: &[Message],
        specs: &[ToolSpec],
        allow_tools: bool,
        temperature: Option<f32>,
    ) -> MessagesRequest {
        let tools = (!specs.is_empty()).then(|| specs.iter().map(ToolDefinition::from).collect());
        let tool_choice = (!specs.is_empty() && !allow_tools).then(|| serde_json::json!({ "type": "none" }));

        MessagesRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            messages: messages.to_vec(),
            tools,
            tool_choice,
            temperature,
        }
    }

    /// Send one request, waiting on the rate limiter and retrying transient failures.
    async fn send(&self, api_key: &str, request: &MessagesRequest) -> DomainResult<MessagesResponse> {
        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(self.config.retry.initial_backoff_ms))
            .with_max_interval(Duration::from_millis(self.config.retry.max_backoff_ms))
            .with_max_elapsed_time(None)
            .build();

        let max_retries = self.config.retry.max_retries;
        let mut attempt = 0u32;

        backoff::future::retry(policy, || {
            attempt += 1;
            let current = attempt;
            async move {
                self.limiter.until_ready().await;
                match self.send_once(api_key, request).await {
                    Err(backoff::Error::Transient { err, .. }) if current > max_retries => {
                        tracing::warn!(attempt = current, error = %err, "oracle retries exhausted");
                        Err(backoff::Error::permanent(err))
                    }
                    Err(backoff::Error::Transient { err, retry_after }) => {
                        tracing::debug!(attempt = current, error = %err, "transient oracle failure, retrying");
                        Err(backoff::Error::Transient { err, retry_after })
                    }
                    other => other,
                }
            }
        })
        .await
    }

    async fn send_once(
        &self,
        api_key: &str,
        request: &MessagesRequest,
    ) -> Result<MessagesResponse, backoff::Error<DomainError>> {
        let response = self
            .client
            .post(format!("{}/v1/messages", self.config.base_url.trim_end_matches('/')))
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-api-key", api_key)
            .header("anthropic-version", &self.config.api_version)
            .json(request)
            .send()
            .await
            .map_err(|e| backoff::Error::transient(DomainError::OracleUnavailable(format!("API request failed: {e}"))))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body, retry_after));
        }

        response.json::<MessagesResponse>().await.map_err(|e| {
            backoff::Error::permanent(DomainError::OracleUnavailable(format!("Failed to parse response: {e}")))
        })
    }
}

fn build_quota(config: &RateLimitConfig) -> DomainResult<Quota> {
    if !(config.requests_per_second.is_finite() && config.requests_per_second > 0.0) {
        return Err(DomainError::ValidationFailed(
            "rate_limit.requests_per_second must be positive".to_string(),
        ));
    }
    let burst = NonZeroU32::new(config.burst_size)
        .ok_or_else(|| DomainError::ValidationFailed("rate_limit.burst_size must be positive".to_string()))?;
    let period = Duration::from_secs_f64(1.0 / config.requests_per_second);

    Quota::with_period(period)
        .map(|q| q.allow_burst(burst))
        .ok_or_else(|| DomainError::ValidationFailed("rate_limit.requests_per_second is too high".to_string()))
}

/// Map a non-success HTTP status to a retryable or final error.
fn classify_status(status: StatusCode, body: &str, retry_after: Option<Duration>) -> backoff::Error<DomainError> {
    let message = format!("API error {status}: {body}");
    let transient = status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
        || status.as_u16() == 529;

    if transient {
        let err = DomainError::OracleUnavailable(message);
        match retry_after {
            Some(after) => backoff::Error::retry_after(err, after),
            None => backoff::Error::transient(err),
        }
    } else {
        backoff::Error::permanent(DomainError::OracleRejected(message))
    }
}

#[async_trait]
impl ReasoningOracle for AnthropicOracle {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn complete(&self, request: OracleRequest) -> DomainResult<String> {
        let api_key = self
            .config
            .get_api_key()
            .ok_or_else(|| DomainError::OracleRejected("ANTHROPIC_API_KEY not set".to_string()))?;

        let specs = request.tools.as_ref().map(|t| t.specs()).unwrap_or_default();
        let mut messages = vec![Message {
            role: MessageRole::User,
            content: vec![ContentBlock::Text {
                text: request.prompt.clone(),
            }],
        }];
        let mut rounds = 0u32;

        loop {
            let allow_tools = rounds < self.config.max_tool_rounds;
            let api_request = self.build_request(&messages, &specs, allow_tools, request.temperature);
            let response = self.send(&api_key, &api_request).await?;

            if let Some(usage) = &response.usage {
                tracing::debug!(
                    purpose = request.purpose.as_str(),
                    round = rounds,
                    input_tokens = usage.input_tokens,
                    output_tokens = usage.output_tokens,
                    "oracle response"
                );
            }

            let tool_uses = response.tool_uses();
            let wants_tools = response.stop_reason.as_deref() == Some("tool_use") && !tool_uses.is_empty();

            let invoker = match (&request.tools, wants_tools && allow_tools) {
                (Some(invoker), true) => invoker,
                _ => {
                    let text = response.text();
                    if text.trim().is_empty() {
                        return Err(DomainError::OracleUnavailable("Oracle returned no text".to_string()));
                    }
                    return Ok(text);
                }
            };

            let mut results = Vec::with_capacity(tool_uses.len());
            for (id, call) in &tool_uses {
                tracing::debug!(tool = %call.name, "dispatching tool call");
                let output = invoker.invoke(call).await;
                results.push(ContentBlock::ToolResult {
                    tool_use_id: id.clone(),
                    content: output.content,
                    is_error: output.is_error.then_some(true),
                });
            }

            messages.push(Message {
                role: MessageRole::Assistant,
                content: response
                    .content
                    .into_iter()
                    .filter(|b| !matches!(b, ContentBlock::Unsupported))
                    .collect(),
            });
            messages.push(Message {
                role: MessageRole::User,
                content: results,
            });
            rounds += 1;
        }
    }
}
