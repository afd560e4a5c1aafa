//! Table output for investigation and lesson listings using comfy-table.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use super::truncate;
use crate::domain::models::{InvestigationState, InvestigationSummary, LessonSummary};

/// Table formatter for CLI output
pub struct TableFormatter {
    use_colors: bool,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
        }
    }

    pub const fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    pub fn format_investigations(&self, investigations: &[InvestigationSummary]) -> String {
        let mut table = self.create_base_table();
        table.set_header(header(&["ID", "Title", "State", "Turns", "Hints", "Started"]));

        for inv in investigations {
            let state_cell = if self.use_colors {
                Cell::new(inv.current_state).fg(state_color(inv.current_state))
            } else {
                Cell::new(format!("{} {}", state_icon(inv.current_state), inv.current_state))
            };

            table.add_row(vec![
                Cell::new(&inv.id.to_string()[..8]),
                Cell::new(truncate(&inv.title, 50)),
                state_cell,
                Cell::new(inv.turns),
                Cell::new(inv.hints_given),
                Cell::new(inv.created_at.format("%Y-%m-%d %H:%M")),
            ]);
        }

        table.to_string()
    }

    pub fn format_lessons(&self, lessons: &[LessonSummary]) -> String {
        let mut table = self.create_base_table();
        table.set_header(header(&["ID", "Title", "Slides", "Minutes", "Created"]));

        for lesson in lessons {
            table.add_row(vec![
                Cell::new(&lesson.id.to_string()[..8]),
                Cell::new(truncate(&lesson.title, 50)),
                Cell::new(lesson.slide_count),
                Cell::new(lesson.estimated_duration_minutes),
                Cell::new(lesson.created_at.format("%Y-%m-%d %H:%M")),
            ]);
        }

        table.to_string()
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Dynamic);
        if !self.use_colors {
            table.force_no_tty();
        }
        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn header(names: &[&str]) -> Vec<Cell> {
    names
        .iter()
        .map(|name| Cell::new(name).add_attribute(Attribute::Bold))
        .collect()
}

/// Check if color output is supported
fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }
    !matches!(env::var("TERM").as_deref(), Ok("dumb"))
}

pub(crate) const fn state_color(state: InvestigationState) -> Color {
    match state {
        InvestigationState::Investigating => Color::Cyan,
        InvestigationState::Solved => Color::Green,
        InvestigationState::GivenUp => Color::DarkGrey,
    }
}

const fn state_icon(state: InvestigationState) -> &'static str {
    match state {
        InvestigationState::Investigating => "⟳",
        InvestigationState::Solved => "✓",
        InvestigationState::GivenUp => "⊘",
    }
}
