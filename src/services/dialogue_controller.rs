//! One dialogue turn against an investigation.
//!
//! The turn order is fixed: give-up detection, then grading, then coaching.
//! Oracle failures never surface as errors; the user gets the fallback reply
//! and the investigation state is left where it was.

use std::sync::Arc;
use std::time::Duration;

use super::complete_within;
use super::hint_policy::{hint_eligible, is_giving_up};
use super::prompts::{coaching_prompt, give_up_reply, solved_reply, FALLBACK_REPLY};
use super::solution_grader::SolutionGrader;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    Investigation, InvestigationConfig, InvestigationState, InvestigationVariant, TurnRecord, TurnReply,
};
use crate::domain::ports::{OraclePurpose, OracleRequest, ReasoningOracle};

#[derive(Debug, Clone)]
pub struct DialogueConfig {
    /// Trailing chat entries included in a coaching prompt
    pub history_window: usize,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self::from(&InvestigationConfig::default())
    }
}

impl From<&InvestigationConfig> for DialogueConfig {
    fn from(config: &InvestigationConfig) -> Self {
        Self {
            history_window: config.history_window,
            temperature: config.temperature,
            timeout: Duration::from_secs(config.oracle_timeout_secs),
        }
    }
}

pub struct DialogueController {
    oracle: Arc<dyn ReasoningOracle>,
    grader: SolutionGrader,
    config: DialogueConfig,
}

impl DialogueController {
    pub fn new(oracle: Arc<dyn ReasoningOracle>, grader: SolutionGrader, config: DialogueConfig) -> Self {
        Self { oracle, grader, config }
    }

    pub const fn grader(&self) -> &SolutionGrader {
        &self.grader
    }

    /// Process one user message and apply the outcome to `investigation`.
    ///
    /// `id` only labels errors and logs. A closed investigation is rejected
    /// with `InvestigationClosed` and left untouched.
    pub async fn take_turn(
        &self,
        investigation: &mut Investigation,
        id: &str,
        variant: InvestigationVariant,
        message: &str,
    ) -> DomainResult<TurnReply> {
        if investigation.is_terminal() {
            return Err(DomainError::InvestigationClosed {
                id: id.to_string(),
                state: investigation.current_state,
            });
        }

        let record = self.decide(investigation, id, variant, message).await?;
        let reply = TurnReply {
            reply: record.reply.clone(),
            is_correct: record.is_correct,
            hint_provided: record.hint_provided,
            completed: record.next_state.is_terminal(),
        };
        let next_state = record.next_state;

        investigation.record_turn(message, record)?;

        tracing::info!(
            investigation = id,
            state = %next_state,
            is_correct = reply.is_correct,
            hint_provided = reply.hint_provided,
            hints_given = investigation.hints_given,
            "turn recorded"
        );
        Ok(reply)
    }

    async fn decide(
        &self,
        investigation: &Investigation,
        id: &str,
        variant: InvestigationVariant,
        message: &str,
    ) -> DomainResult<TurnRecord> {
        if is_giving_up(message) {
            tracing::debug!(investigation = id, "user gave up");
            return Ok(TurnRecord {
                reply: give_up_reply(&investigation.solution),
                is_correct: false,
                hint_provided: false,
                next_state: InvestigationState::GivenUp,
            });
        }

        match self
            .grader
            .grade(&investigation.problem_description, &investigation.solution, message)
            .await
        {
            Ok(true) => {
                return Ok(TurnRecord {
                    reply: solved_reply(&investigation.solution),
                    is_correct: true,
                    hint_provided: false,
                    next_state: InvestigationState::Solved,
                })
            }
            Ok(false) => {}
            Err(e) if e.is_oracle_failure() => {
                tracing::warn!(investigation = id, error = %e, "grading failed, sending fallback reply");
                return Ok(fallback());
            }
            Err(e) => return Err(e),
        }

        let provide_hint = hint_eligible(message, investigation.history_len(), investigation.hints_given);
        let prompt = coaching_prompt(investigation, message, provide_hint, variant, self.config.history_window);
        let request = OracleRequest::new(OraclePurpose::Coaching, prompt).with_temperature(self.config.temperature);

        match complete_within(self.oracle.as_ref(), request, self.config.timeout).await {
            Ok(text) if !text.trim().is_empty() => Ok(TurnRecord {
                reply: text.trim().to_string(),
                is_correct: false,
                hint_provided: provide_hint,
                next_state: InvestigationState::Investigating,
            }),
            Ok(_) => {
                tracing::warn!(investigation = id, "empty coaching reply, sending fallback reply");
                Ok(fallback())
            }
            Err(e) if e.is_oracle_failure() => {
                tracing::warn!(investigation = id, error = %e, "coaching failed, sending fallback reply");
                Ok(fallback())
            }
            Err(e) => Err(e),
        }
    }
}

fn fallback() -> TurnRecord {
    TurnRecord {
        reply: FALLBACK_REPLY.to_string(),
        is_correct: false,
        hint_provided: false,
        next_state: InvestigationState::Investigating,
    }
}
