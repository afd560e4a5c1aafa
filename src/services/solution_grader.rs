//! Strict grading of a user's explanation against the hidden solution.
//!
//! Cheap structural rules run first: questions, short answers and
//! one-sentence answers are rejected without consulting the oracle. Anything
//! that survives goes to the oracle, whose reply counts as correct only when
//! it starts with `CORRECT`.

use std::sync::Arc;
use std::time::Duration;

use super::complete_within;
use crate::domain::errors::DomainResult;
use crate::domain::models::InvestigationConfig;
use crate::domain::ports::{OraclePurpose, OracleRequest, ReasoningOracle};
use crate::services::prompts::grading_prompt;

/// How the oracle's grading reply was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
    /// Neither token led the reply; treated as incorrect
    Ambiguous,
}

impl Verdict {
    /// Only the leading token matters, compared case-insensitively.
    pub fn from_response(response: &str) -> Self {
        let normalized = response.trim().to_uppercase();
        if normalized.starts_with("CORRECT") {
            Self::Correct
        } else if normalized.starts_with("INCORRECT") {
            Self::Incorrect
        } else {
            Self::Ambiguous
        }
    }

    pub const fn is_correct(self) -> bool {
        matches!(self, Self::Correct)
    }
}

/// Why an answer was rejected before grading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Question,
    TooShort { words: usize, required: usize },
    TooFewSentences { sentences: usize, required: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradingPolicy {
    pub min_words: usize,
    pub min_sentences: usize,
}

impl Default for GradingPolicy {
    fn default() -> Self {
        Self {
            min_words: 50,
            min_sentences: 2,
        }
    }
}

impl From<&InvestigationConfig> for GradingPolicy {
    fn from(config: &InvestigationConfig) -> Self {
        Self {
            min_words: config.min_answer_words,
            min_sentences: config.min_answer_sentences,
        }
    }
}

pub fn word_count(message: &str) -> usize {
    message.split_whitespace().count()
}

/// Closing punctuation that may follow a sentence terminator.
const CLOSERS: [char; 9] = ['"', '\'', ')', ']', '}', '*', '`', '\u{201d}', '\u{2019}'];

const ABBREVIATIONS: [&str; 5] = ["etc", "vs", "cf", "approx", "incl"];

/// `e.g.`, `i.e.`, `U.S.` and a few common short forms.
fn is_abbreviation(stem: &str) -> bool {
    let dotted = stem.contains('.')
        && stem
            .split('.')
            .all(|part| !part.is_empty() && part.len() <= 2 && part.chars().all(char::is_alphabetic));
    dotted || ABBREVIATIONS.iter().any(|a| stem.eq_ignore_ascii_case(a))
}

/// Whether a whitespace-separated token closes a sentence.
fn ends_sentence(token: &str) -> bool {
    let token = token.trim_end_matches(CLOSERS);
    if token.ends_with(['!', '?']) {
        return true;
    }
    match token.strip_suffix('.') {
        Some(stem) => !is_abbreviation(stem.trim_start_matches(['(', '"', '\''])),
        None => false,
    }
}

/// Sentences with at least one letter or digit.
///
/// A terminator only counts when whitespace or the end of the text follows
/// it, so `account.currency` and `v1.2` stay inside one sentence.
pub fn sentence_count(message: &str) -> usize {
    let mut count = 0;
    let mut has_content = false;
    for token in message.split_whitespace() {
        has_content |= token.chars().any(char::is_alphanumeric);
        if ends_sentence(token) && has_content {
            count += 1;
            has_content = false;
        }
    }
    count + usize::from(has_content)
}

impl GradingPolicy {
    /// Structural rejection, if any. `None` means the oracle must decide.
    pub fn precheck(&self, message: &str) -> Option<Rejection> {
        let trimmed = message.trim_end();
        if trimmed.trim_end_matches(CLOSERS).trim_end().ends_with('?') {
            return Some(Rejection::Question);
        }

        let words = word_count(trimmed);
        if words < self.min_words {
            return Some(Rejection::TooShort {
                words,
                required: self.min_words,
            });
        }

        let sentences = sentence_count(trimmed);
        if sentences < self.min_sentences {
            return Some(Rejection::TooFewSentences {
                sentences,
                required: self.min_sentences,
            });
        }

        None
    }
}

pub struct SolutionGrader {
    oracle: Arc<dyn ReasoningOracle>,
    policy: GradingPolicy,
    timeout: Duration,
}

impl SolutionGrader {
    pub fn new(oracle: Arc<dyn ReasoningOracle>, policy: GradingPolicy, timeout: Duration) -> Self {
        Self {
            oracle,
            policy,
            timeout,
        }
    }

    pub const fn policy(&self) -> &GradingPolicy {
        &self.policy
    }

    /// Grade one explanation. Errors only when the oracle cannot be reached.
    pub async fn grade(&self, problem_description: &str, solution: &str, message: &str) -> DomainResult<bool> {
        if let Some(rejection) = self.policy.precheck(message) {
            tracing::debug!(?rejection, "answer rejected before grading");
            return Ok(false);
        }

        let prompt = grading_prompt(problem_description, solution, message, self.policy.min_words);
        let request = OracleRequest::new(OraclePurpose::Grading, prompt).with_temperature(0.0);
        let response = complete_within(self.oracle.as_ref(), request, self.timeout).await?;

        let verdict = Verdict::from_response(&response);
        if verdict == Verdict::Ambiguous {
            let head: String = response.chars().take(80).collect();
            tracing::warn!(response = %head, "ambiguous grading reply, treating as INCORRECT");
        }
        Ok(verdict.is_correct())
    }
}
