//! Infrastructure layer module
//!
//! Process-level concerns that are not adapters for a domain port:
//! - Configuration management (figment)
//! - Logging infrastructure (tracing)

pub mod config;
pub mod logging;
