//! Investigation domain model.
//!
//! An investigation is a reconstructed past incident the user must explain.
//! The same record backs both a standalone [`InvestigationSession`] and an
//! interactive slide embedded in a lesson, so every state mutation lives here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};

/// Lifecycle state of an investigation.
///
/// `Solved` and `GivenUp` are terminal: once reached, the investigation never
/// changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InvestigationState {
    /// User is still asking questions and proposing explanations
    #[default]
    Investigating,
    /// A user explanation was graded correct
    Solved,
    /// User asked for the answer
    GivenUp,
}

impl InvestigationState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Investigating => "investigating",
            Self::Solved => "solved",
            Self::GivenUp => "given_up",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "investigating" => Some(Self::Investigating),
            "solved" => Some(Self::Solved),
            "given_up" => Some(Self::GivenUp),
            _ => None,
        }
    }

    /// Only `investigating -> solved` and `investigating -> given_up` are legal.
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Investigating, Self::Solved) | (Self::Investigating, Self::GivenUp)
        )
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Solved | Self::GivenUp)
    }
}

impl fmt::Display for InvestigationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Author of a chat entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One entry of the investigation dialogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub role: ChatRole,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Grading flag, present on assistant entries only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
    /// Hint flag, present on assistant entries only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint_provided: Option<bool>,
}

impl ChatEntry {
    pub fn user(message: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            message: message.into(),
            timestamp: Utc::now(),
            is_correct: None,
            hint_provided: None,
        }
    }

    pub fn assistant(message: impl Into<String>, is_correct: bool, hint_provided: bool) -> Self {
        Self {
            role: ChatRole::Assistant,
            message: message.into(),
            timestamp: Utc::now(),
            is_correct: Some(is_correct),
            hint_provided: Some(hint_provided),
        }
    }
}

/// Persistence shape an investigation lives in.
///
/// The variant selects the synthesis output schema and the reply length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestigationVariant {
    Standalone,
    Slide,
}

impl InvestigationVariant {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Standalone => "standalone",
            Self::Slide => "slide",
        }
    }
}

/// Problem definition produced by synthesis, before any dialogue happens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesizedProblem {
    pub title: String,
    pub problem_description: String,
    pub problem_context: String,
    pub solution: String,
    #[serde(default)]
    pub hints: Vec<String>,
}

/// Result of one dialogue turn, as returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReply {
    pub reply: String,
    pub is_correct: bool,
    pub hint_provided: bool,
    pub completed: bool,
}

/// The mutation a controller decided on for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRecord {
    pub reply: String,
    pub is_correct: bool,
    pub hint_provided: bool,
    pub next_state: InvestigationState,
}

/// Investigation state shared by standalone sessions and lesson slides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Investigation {
    pub title: String,
    pub problem_description: String,
    pub problem_context: String,
    /// Hidden root cause and fix; the grader's only source of truth
    pub solution: String,
    /// Static nudges from synthesis; stored, never shown to clients
    #[serde(default)]
    pub hints: Vec<String>,
    #[serde(default)]
    pub current_state: InvestigationState,
    #[serde(default)]
    pub hints_given: u32,
    #[serde(default)]
    pub chat_history: Vec<ChatEntry>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Investigation {
    pub fn from_problem(problem: SynthesizedProblem) -> Self {
        Self {
            title: problem.title,
            problem_description: problem.problem_description,
            problem_context: problem.problem_context,
            solution: problem.solution,
            hints: problem.hints,
            current_state: InvestigationState::Investigating,
            hints_given: 0,
            chat_history: Vec::new(),
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub const fn is_terminal(&self) -> bool {
        self.current_state.is_terminal()
    }

    /// Number of chat entries before the next turn is appended.
    pub fn history_len(&self) -> usize {
        self.chat_history.len()
    }

    /// The trailing `window` chat entries, oldest first.
    pub fn recent_history(&self, window: usize) -> &[ChatEntry] {
        let start = self.chat_history.len().saturating_sub(window);
        &self.chat_history[start..]
    }

    /// Apply one complete turn: the user entry, the assistant entry, the hint
    /// counter and any state change. Either all of it applies or none of it.
    pub fn record_turn(&mut self, user_message: &str, record: TurnRecord) -> DomainResult<()> {
        let changes_state = record.next_state != self.current_state;
        if self.is_terminal() || (changes_state && !self.current_state.can_transition_to(record.next_state)) {
            return Err(DomainError::InvalidStateTransition {
                from: self.current_state,
                to: record.next_state,
            });
        }

        self.chat_history.push(ChatEntry::user(user_message));
        self.chat_history.push(ChatEntry::assistant(
            record.reply,
            record.is_correct,
            record.hint_provided,
        ));

        if record.hint_provided {
            self.hints_given += 1;
        }

        if changes_state {
            self.current_state = record.next_state;
            self.completed_at.get_or_insert_with(Utc::now);
        }

        Ok(())
    }

    /// Check a stored or imported investigation for internal consistency.
    ///
    /// Synthesized investigations satisfy this by construction; imported
    /// documents are checked before they are accepted.
    pub fn check_integrity(&self) -> DomainResult<()> {
        let invalid = |reason: String| Err(DomainError::ValidationFailed(format!("Investigation '{}': {reason}", self.title)));

        for (field, value) in [
            ("title", &self.title),
            ("problem_description", &self.problem_description),
            ("solution", &self.solution),
        ] {
            if value.trim().is_empty() {
                return invalid(format!("{field} must not be empty"));
            }
        }
        if self.problem_description.contains(self.solution.trim()) {
            return invalid("problem_description reveals the solution".to_string());
        }

        if self.completed_at.is_some() != self.is_terminal() {
            return invalid(format!(
                "completed_at must be set exactly when the state is terminal (state is {})",
                self.current_state
            ));
        }

        if self.chat_history.len() % 2 != 0 {
            return invalid("chat_history must hold whole turns".to_string());
        }
        let mut hints = 0u32;
        for turn in self.chat_history.chunks_exact(2) {
            let (user, assistant) = (&turn[0], &turn[1]);
            let well_formed = user.role == ChatRole::User
                && user.is_correct.is_none()
                && user.hint_provided.is_none()
                && assistant.role == ChatRole::Assistant
                && assistant.is_correct.is_some()
                && assistant.hint_provided.is_some();
            if !well_formed {
                return invalid("chat_history must alternate user and assistant entries".to_string());
            }
            if assistant.hint_provided == Some(true) {
                hints += 1;
            }
        }
        if hints != self.hints_given {
            return invalid(format!(
                "hints_given is {} but chat_history records {hints} hints",
                self.hints_given
            ));
        }

        Ok(())
    }

    /// Client-facing projection, without the solution or static hints.
    pub fn view(&self, id: impl Into<String>) -> InvestigationView {
        InvestigationView {
            id: id.into(),
            title: self.title.clone(),
            problem_description: self.problem_description.clone(),
            problem_context: self.problem_context.clone(),
            current_state: self.current_state,
            hints_given: self.hints_given,
            chat_history: self.chat_history.clone(),
            created_at: self.created_at,
            completed_at: self.completed_at,
        }
    }
}

/// A standalone investigation owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestigationSession {
    pub id: Uuid,
    pub owner: String,
    #[serde(flatten)]
    pub investigation: Investigation,
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency stamp maintained by the store
    #[serde(skip)]
    pub version: i64,
}

impl InvestigationSession {
    pub fn new(owner: impl Into<String>, investigation: Investigation) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner: owner.into(),
            updated_at: investigation.created_at,
            investigation,
            version: 0,
        }
    }

    pub fn view(&self) -> InvestigationView {
        self.investigation.view(self.id.to_string())
    }

    pub fn summary(&self) -> InvestigationSummary {
        InvestigationSummary {
            id: self.id,
            title: self.investigation.title.clone(),
            current_state: self.investigation.current_state,
            hints_given: self.investigation.hints_given,
            turns: self.investigation.chat_history.len() / 2,
            created_at: self.investigation.created_at,
            completed_at: self.investigation.completed_at,
        }
    }
}

/// Listing row for a user's investigations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestigationSummary {
    pub id: Uuid,
    pub title: String,
    pub current_state: InvestigationState,
    pub hints_given: u32,
    pub turns: usize,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// What a client is allowed to see of an investigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestigationView {
    pub id: String,
    pub title: String,
    pub problem_description: String,
    pub problem_context: String,
    pub current_state: InvestigationState,
    pub hints_given: u32,
    pub chat_history: Vec<ChatEntry>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}
