//! Reasoning oracle port.
//!
//! The oracle is an opaque text-completion capability. It may call the tools
//! it is offered any number of times before producing its final text; the
//! caller decides how much of that it is willing to pay for by wrapping the
//! tools (see `services::EvidenceToolbox`).

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::errors::DomainResult;
use crate::domain::models::{ToolCall, ToolOutput, ToolSpec};

/// Why the oracle is being asked; used for logging and by test doubles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OraclePurpose {
    Synthesis,
    Grading,
    Coaching,
}

impl OraclePurpose {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Synthesis => "synthesis",
            Self::Grading => "grading",
            Self::Coaching => "coaching",
        }
    }
}

/// Tools the oracle may call mid-reasoning.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    /// Tool definitions to advertise.
    fn specs(&self) -> Vec<ToolSpec>;

    /// Execute one call. Failures are reported to the oracle as error output,
    /// never as a Rust error.
    async fn invoke(&self, call: &ToolCall) -> ToolOutput;
}

/// One completion request.
#[derive(Clone)]
pub struct OracleRequest {
    pub purpose: OraclePurpose,
    pub prompt: String,
    pub temperature: Option<f32>,
    pub tools: Option<Arc<dyn ToolInvoker>>,
}

impl OracleRequest {
    pub fn new(purpose: OraclePurpose, prompt: impl Into<String>) -> Self {
        Self {
            purpose,
            prompt: prompt.into(),
            temperature: None,
            tools: None,
        }
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub fn with_tools(mut self, tools: Arc<dyn ToolInvoker>) -> Self {
        self.tools = Some(tools);
        self
    }
}

impl std::fmt::Debug for OracleRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleRequest")
            .field("purpose", &self.purpose)
            .field("prompt_len", &self.prompt.len())
            .field("temperature", &self.temperature)
            .field("has_tools", &self.tools.is_some())
            .finish()
    }
}

/// External reasoning capability.
#[async_trait]
pub trait ReasoningOracle: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &'static str;

    /// Run the request to completion and return the final text.
    ///
    /// Transient failures map to `OracleUnavailable`; permanent ones to
    /// `OracleRejected`.
    async fn complete(&self, request: OracleRequest) -> DomainResult<String>;
}
