//! Lesson commands: import, browse, and play investigation slides.

use anyhow::{Context, Result};
use clap::Subcommand;
use console::style;
use std::path::PathBuf;

use super::investigate::{render_investigation, render_turn, state_label, ActionOutput};
use crate::cli::context::AppContext;
use crate::cli::id_resolver::resolve_lesson_id;
use crate::cli::output::{create_spinner, output, CommandOutput, ProgressBarExt, TableFormatter};
use crate::domain::models::{InvestigationView, LessonDraft, LessonSummary, LessonView, SlideTurn, SlideView};

#[derive(Subcommand, Debug)]
pub enum LessonCommands {
    /// Import a lesson from a JSON file
    Import {
        /// Path to the lesson JSON (title, description, slides)
        file: PathBuf,
    },
    /// List your lessons
    List,
    /// Show a lesson and its slides
    Show {
        /// Lesson ID or unique prefix
        id: String,
    },
    /// Generate an investigation and append it as the lesson's last slide
    Investigate {
        /// Lesson ID or unique prefix
        lesson_id: String,
        /// Topic to steer problem selection
        topic: Option<String>,
    },
    /// Send a message to an investigation slide
    Say {
        /// Lesson ID or unique prefix
        lesson_id: String,
        /// Slide ID
        slide_id: String,
        /// Question, explanation, or "I give up"
        message: String,
    },
    /// Delete a lesson
    Delete {
        /// Lesson ID or unique prefix
        id: String,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct LessonDetailOutput {
    #[serde(flatten)]
    pub lesson: LessonView,
}

fn render_slide(lines: &mut Vec<String>, index: usize, slide: &SlideView) {
    let heading = |kind: &str, id: &str, title: &str| {
        format!("{} {} {} {}", style(format!("[{}]", index + 1)).bold(), style(kind).dim(), title, style(id).dim())
    };
    match slide {
        SlideView::Info(s) => {
            lines.push(heading("info", &s.id, &s.title));
            lines.push(format!("    {}", s.content));
        }
        SlideView::Video(s) => {
            lines.push(heading("video", &s.id, &s.title));
            lines.push(format!("    {}", s.video_url));
        }
        SlideView::Mcq(s) => {
            lines.push(heading("mcq", &s.id, &s.question));
            for option in &s.options {
                lines.push(format!("    {}) {}", option.id, option.text));
            }
        }
        SlideView::DragDrop(s) => {
            lines.push(heading("drag_drop", &s.id, &s.question));
            lines.push(format!("    categories: {}", s.categories.join(", ")));
        }
        SlideView::InteractiveInvestigation(inv) => {
            lines.push(heading("investigation", &inv.id, &inv.title));
            lines.push(format!("    state: {}, turns: {}", state_label(inv.current_state), inv.chat_history.len() / 2));
        }
    }
}

impl CommandOutput for LessonDetailOutput {
    fn to_human(&self) -> String {
        let lesson = &self.lesson;
        let mut lines = vec![
            format!("{}", style(&lesson.title).bold()),
            format!("ID: {}", lesson.id),
            format!("Estimated duration: {} min", lesson.estimated_duration_minutes),
            lesson.description.clone(),
            String::new(),
        ];
        if lesson.slides.is_empty() {
            lines.push("No slides.".to_string());
        }
        for (i, slide) in lesson.slides.iter().enumerate() {
            render_slide(&mut lines, i, slide);
        }
        lines.join("\n")
    }
}

#[derive(Debug, serde::Serialize)]
pub struct LessonListOutput {
    pub lessons: Vec<LessonSummary>,
    pub total: usize,
}

impl CommandOutput for LessonListOutput {
    fn to_human(&self) -> String {
        if self.lessons.is_empty() {
            return "No lessons found. Import one with 'sleuth lesson import'.".to_string();
        }
        format!(
            "Found {} lesson(s):\n{}",
            self.total,
            TableFormatter::new().format_lessons(&self.lessons)
        )
    }
}

#[derive(Debug, serde::Serialize)]
pub struct SlideOutput {
    #[serde(flatten)]
    pub slide: InvestigationView,
}

impl CommandOutput for SlideOutput {
    fn to_human(&self) -> String {
        render_investigation(&self.slide).join("\n")
    }
}

#[derive(Debug, serde::Serialize)]
pub struct SlideTurnOutput {
    #[serde(flatten)]
    pub result: SlideTurn,
}

impl CommandOutput for SlideTurnOutput {
    fn to_human(&self) -> String {
        format!(
            "{}\n\n{} {}",
            render_turn(&self.result.turn),
            style("slide state:").dim(),
            state_label(self.result.slide.current_state)
        )
    }
}

pub async fn execute(command: LessonCommands, ctx: &AppContext, json_mode: bool) -> Result<()> {
    let owner = ctx.owner.as_str();

    match command {
        LessonCommands::Import { file } => {
            let raw = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let draft: LessonDraft =
                serde_json::from_str(&raw).with_context(|| format!("Invalid lesson JSON in {}", file.display()))?;
            let lesson = ctx.service.import_lesson(owner, draft).await?;
            output(&LessonDetailOutput { lesson }, json_mode);
        }

        LessonCommands::List => {
            let lessons = ctx.service.list_lessons(owner).await?;
            let total = lessons.len();
            output(&LessonListOutput { lessons, total }, json_mode);
        }

        LessonCommands::Show { id } => {
            let id = resolve_lesson_id(&ctx.pool, owner, &id).await?;
            let lesson = ctx.service.get_lesson(owner, id).await?;
            output(&LessonDetailOutput { lesson }, json_mode);
        }

        LessonCommands::Investigate { lesson_id, topic } => {
            let lesson_id = resolve_lesson_id(&ctx.pool, owner, &lesson_id).await?;
            let spinner = create_spinner("Digging through the team's history...", json_mode);
            match ctx.service.add_investigation_slide(owner, lesson_id, topic.as_deref()).await {
                Ok(slide) => {
                    spinner.finish_success("Investigation slide added");
                    output(&SlideOutput { slide }, json_mode);
                }
                Err(e) => {
                    spinner.finish_error("Could not build an investigation");
                    return Err(e.into());
                }
            }
        }

        LessonCommands::Say {
            lesson_id,
            slide_id,
            message,
        } => {
            let lesson_id = resolve_lesson_id(&ctx.pool, owner, &lesson_id).await?;
            let spinner = create_spinner("Thinking...", json_mode);
            let result = ctx.service.post_slide_message(owner, lesson_id, &slide_id, &message).await;
            spinner.finish_and_clear();
            output(&SlideTurnOutput { result: result? }, json_mode);
        }

        LessonCommands::Delete { id } => {
            let id = resolve_lesson_id(&ctx.pool, owner, &id).await?;
            ctx.service.delete_lesson(owner, id).await?;
            output(
                &ActionOutput {
                    success: true,
                    message: format!("Lesson {id} deleted."),
                },
                json_mode,
            );
        }
    }

    Ok(())
}
