//! Standalone investigation commands.

use anyhow::Result;
use clap::Subcommand;
use console::style;

use crate::cli::context::AppContext;
use crate::cli::id_resolver::resolve_investigation_id;
use crate::cli::output::{create_spinner, output, CommandOutput, ProgressBarExt, TableFormatter};
use crate::domain::models::{
    ChatEntry, ChatRole, InvestigationState, InvestigationSummary, InvestigationView, TurnReply,
};

#[derive(Subcommand, Debug)]
pub enum InvestigateCommands {
    /// Generate a new investigation from the team's history
    Start {
        /// Topic to steer problem selection (e.g. "null pointer bug")
        topic: Option<String>,
    },
    /// Send a message to an investigation
    Say {
        /// Investigation ID or unique prefix
        id: String,
        /// Question, explanation, or "I give up"
        message: String,
    },
    /// Show an investigation and its conversation
    Show {
        /// Investigation ID or unique prefix
        id: String,
    },
    /// List your investigations
    List,
    /// Delete an investigation
    Delete {
        /// Investigation ID or unique prefix
        id: String,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct InvestigationDetailOutput {
    #[serde(flatten)]
    pub investigation: InvestigationView,
}

pub(crate) fn state_label(state: InvestigationState) -> String {
    match state {
        InvestigationState::Investigating => style(state).cyan().to_string(),
        InvestigationState::Solved => style(state).green().bold().to_string(),
        InvestigationState::GivenUp => style(state).dim().to_string(),
    }
}

pub(crate) fn render_chat(lines: &mut Vec<String>, history: &[ChatEntry]) {
    for entry in history {
        match entry.role {
            ChatRole::User => lines.push(format!("{} {}", style("you:").bold(), entry.message)),
            ChatRole::Assistant => {
                let tag = if entry.hint_provided == Some(true) {
                    format!(" {}", style("(hint)").yellow())
                } else {
                    String::new()
                };
                lines.push(format!("{}{} {}", style("sleuth:").magenta().bold(), tag, entry.message));
            }
        }
        lines.push(String::new());
    }
}

pub(crate) fn render_investigation(view: &InvestigationView) -> Vec<String> {
    let mut lines = vec![
        format!("{}", style(&view.title).bold()),
        format!("ID: {}", view.id),
        format!("State: {}", state_label(view.current_state)),
        format!("Hints given: {}", view.hints_given),
        String::new(),
        format!("{}", style("Problem").underlined()),
        view.problem_description.clone(),
        String::new(),
        format!("{}", style("Context").underlined()),
        view.problem_context.clone(),
    ];
    if !view.chat_history.is_empty() {
        lines.push(String::new());
        lines.push(format!("{}", style("Conversation").underlined()));
        render_chat(&mut lines, &view.chat_history);
    }
    lines
}

impl CommandOutput for InvestigationDetailOutput {
    fn to_human(&self) -> String {
        render_investigation(&self.investigation).join("\n")
    }
}

#[derive(Debug, serde::Serialize)]
pub struct TurnOutput {
    #[serde(flatten)]
    pub turn: TurnReply,
}

pub(crate) fn render_turn(turn: &TurnReply) -> String {
    let mut lines = vec![turn.reply.clone()];
    if turn.hint_provided {
        lines.push(format!("\n{}", style("(hint given)").yellow()));
    }
    if turn.completed {
        let closing = if turn.is_correct {
            style("Investigation solved.").green().bold()
        } else {
            style("Investigation closed.").dim()
        };
        lines.push(format!("\n{closing}"));
    }
    lines.join("\n")
}

impl CommandOutput for TurnOutput {
    fn to_human(&self) -> String {
        render_turn(&self.turn)
    }
}

#[derive(Debug, serde::Serialize)]
pub struct InvestigationListOutput {
    pub investigations: Vec<InvestigationSummary>,
    pub total: usize,
}

impl CommandOutput for InvestigationListOutput {
    fn to_human(&self) -> String {
        if self.investigations.is_empty() {
            return "No investigations found. Start one with 'sleuth investigate start'.".to_string();
        }
        format!(
            "Found {} investigation(s):\n{}",
            self.total,
            TableFormatter::new().format_investigations(&self.investigations)
        )
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ActionOutput {
    pub success: bool,
    pub message: String,
}

impl CommandOutput for ActionOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }
}

pub async fn execute(command: InvestigateCommands, ctx: &AppContext, json_mode: bool) -> Result<()> {
    let owner = ctx.owner.as_str();

    match command {
        InvestigateCommands::Start { topic } => {
            let spinner = create_spinner("Digging through the team's history...", json_mode);
            let result = ctx.service.start_investigation(owner, topic.as_deref()).await;
            match result {
                Ok(investigation) => {
                    spinner.finish_success("Investigation ready");
                    output(&InvestigationDetailOutput { investigation }, json_mode);
                }
                Err(e) => {
                    spinner.finish_error("Could not build an investigation");
                    return Err(e.into());
                }
            }
        }

        InvestigateCommands::Say { id, message } => {
            let id = resolve_investigation_id(&ctx.pool, owner, &id).await?;
            let spinner = create_spinner("Thinking...", json_mode);
            let turn = ctx.service.post_message(owner, id, &message).await;
            spinner.finish_and_clear();
            output(&TurnOutput { turn: turn? }, json_mode);
        }

        InvestigateCommands::Show { id } => {
            let id = resolve_investigation_id(&ctx.pool, owner, &id).await?;
            let investigation = ctx.service.get_investigation(owner, id).await?;
            output(&InvestigationDetailOutput { investigation }, json_mode);
        }

        InvestigateCommands::List => {
            let investigations = ctx.service.list_investigations(owner).await?;
            let total = investigations.len();
            output(&InvestigationListOutput { investigations, total }, json_mode);
        }

        InvestigateCommands::Delete { id } => {
            let id = resolve_investigation_id(&ctx.pool, owner, &id).await?;
            ctx.service.delete_investigation(owner, id).await?;
            output(
                &ActionOutput {
                    success: true,
                    message: format!("Investigation {id} deleted."),
                },
                json_mode,
            );
        }
    }

    Ok(())
}
