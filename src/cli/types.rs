//! CLI type definitions
//!
//! Clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};

use super::commands::init::InitArgs;
use super::commands::investigate::InvestigateCommands;
use super::commands::lesson::LessonCommands;

#[derive(Parser, Debug)]
#[command(name = "sleuth")]
#[command(about = "Sleuth - learn a codebase by solving its past incidents", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Owner that investigations and lessons are scoped to
    #[arg(long, global = true, env = "SLEUTH_OWNER", default_value = "local")]
    pub owner: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize sleuth configuration and database
    Init(InitArgs),

    /// Standalone investigations
    #[command(subcommand)]
    Investigate(InvestigateCommands),

    /// Lessons and their investigation slides
    #[command(subcommand)]
    Lesson(LessonCommands),
}
