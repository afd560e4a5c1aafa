//! Command-line interface.

pub mod commands;
pub mod context;
pub mod id_resolver;
pub mod output;
pub mod types;

pub use context::AppContext;
pub use types::{Cli, Commands};

use console::style;

use crate::domain::errors::DomainError;

/// Print a command failure and exit with a non-zero status.
///
/// Client errors (unknown id, closed investigation, bad input) exit with 2,
/// everything else with 1.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    let client_error = err
        .downcast_ref::<DomainError>()
        .is_some_and(DomainError::is_client_error);

    if json_mode {
        let body = serde_json::json!({
            "success": false,
            "error": format!("{err:#}"),
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("{} {err:#}", style("error:").red().bold());
    }

    std::process::exit(if client_error { 2 } else { 1 })
}
