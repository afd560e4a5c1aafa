//! Sleuth CLI entry point.

use clap::Parser;

use sleuth::cli::commands::{init, investigate, lesson};
use sleuth::cli::{handle_error, AppContext, Cli, Commands};
use sleuth::infrastructure::config::ConfigLoader;
use sleuth::infrastructure::logging::{cleanup_old_logs, LogConfig, LoggerImpl};

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Init(args) = cli.command {
        return init::execute(args, cli.json).await;
    }

    let config = ConfigLoader::load()?;
    let log_config = LogConfig::from(&config.logging);
    let _logger = LoggerImpl::init(&log_config)?;
    if let Some(dir) = &log_config.log_dir {
        if let Err(err) = cleanup_old_logs(dir, log_config.retention_days).await {
            tracing::warn!(error = %err, "log cleanup failed");
        }
    }

    let ctx = AppContext::new(config, cli.owner).await?;

    match cli.command {
        Commands::Investigate(command) => investigate::execute(command, &ctx, cli.json).await,
        Commands::Lesson(command) => lesson::execute(command, &ctx, cli.json).await,
        Commands::Init(_) => Ok(()),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(err) = run(cli).await {
        handle_error(err, json);
    }
}
