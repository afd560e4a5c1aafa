use serde::{Deserialize, Serialize};

/// Main configuration structure for sleuth
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Reasoning oracle (LLM) configuration
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Rate limiting configuration for oracle requests
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Retry policy configuration for oracle requests
    #[serde(default)]
    pub retry: RetryConfig,

    /// Investigation dialogue and grading policy
    #[serde(default)]
    pub investigation: InvestigationConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".sleuth/sleuth.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Number of days to retain logs
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Directory for rolling log files; stderr only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

const fn default_retention_days() -> u32 {
    30
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            retention_days: default_retention_days(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// Reasoning oracle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OracleConfig {
    /// API key (can also be set via `ANTHROPIC_API_KEY` env var)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model to use
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL for API (for testing/proxies)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Maximum tokens per completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum tool-use rounds before the oracle must answer
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,
}

fn default_model() -> String {
    "claude-sonnet-4-5-20250929".to_string()
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

const fn default_max_tokens() -> u32 {
    4096
}

const fn default_request_timeout_secs() -> u64 {
    120
}

const fn default_max_tool_rounds() -> u32 {
    12
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
            max_tool_rounds: default_max_tool_rounds(),
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RateLimitConfig {
    /// Requests per second allowed
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: f64,

    /// Burst size for token bucket
    #[serde(default = "default_burst_size")]
    pub burst_size: u32,
}

const fn default_requests_per_second() -> f64 {
    2.0
}

const fn default_burst_size() -> u32 {
    5
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_requests_per_second(),
            burst_size: default_burst_size(),
        }
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    1000
}

const fn default_max_backoff_ms() -> u64 {
    30_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// Investigation synthesis, dialogue and grading policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct InvestigationConfig {
    /// Combined retrieval tool calls allowed during synthesis
    #[serde(default = "default_tool_call_budget")]
    pub tool_call_budget: u32,

    /// Snippets returned per retrieval call when the oracle does not ask
    #[serde(default = "default_search_k")]
    pub search_k: usize,

    /// Chat entries included in a coaching prompt
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Explanations shorter than this are never graded correct
    #[serde(default = "default_min_answer_words")]
    pub min_answer_words: usize,

    /// Explanations with fewer sentences are never graded correct
    #[serde(default = "default_min_answer_sentences")]
    pub min_answer_sentences: usize,

    /// Sampling temperature for synthesis and coaching
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Upper bound on one oracle call inside a turn, in seconds
    #[serde(default = "default_oracle_timeout_secs")]
    pub oracle_timeout_secs: u64,
}

const fn default_tool_call_budget() -> u32 {
    8
}

const fn default_search_k() -> usize {
    5
}

const fn default_history_window() -> usize {
    5
}

const fn default_min_answer_words() -> usize {
    50
}

const fn default_min_answer_sentences() -> usize {
    2
}

const fn default_temperature() -> f32 {
    0.3
}

const fn default_oracle_timeout_secs() -> u64 {
    180
}

impl Default for InvestigationConfig {
    fn default() -> Self {
        Self {
            tool_call_budget: default_tool_call_budget(),
            search_k: default_search_k(),
            history_window: default_history_window(),
            min_answer_words: default_min_answer_words(),
            min_answer_sentences: default_min_answer_sentences(),
            temperature: default_temperature(),
            oracle_timeout_secs: default_oracle_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_investigation_defaults() {
        let config = Config::default();
        assert_eq!(config.investigation.tool_call_budget, 8);
        assert_eq!(config.investigation.search_k, 5);
        assert_eq!(config.investigation.history_window, 5);
        assert_eq!(config.investigation.min_answer_words, 50);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "investigation:\n  tool_call_budget: 4\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.investigation.tool_call_budget, 4);
        assert_eq!(config.investigation.search_k, 5);
        assert_eq!(config.database.path, ".sleuth/sleuth.db");
    }
}
