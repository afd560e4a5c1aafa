//! Reasoning oracle adapters.

pub mod anthropic;
pub mod mock;

pub use anthropic::{AnthropicOracle, AnthropicOracleConfig};
pub use mock::{
    sample_problem_json, MockOracle, MockReply, RecordedRequest, SAMPLE_CONTEXT, SAMPLE_DESCRIPTION, SAMPLE_SOLUTION,
    SAMPLE_TITLE,
};
