//! Turn classification rules: giving up and hint eligibility.
//!
//! Both checks are deterministic functions of the message text and the
//! session counters, so replaying a turn always reaches the same decision.

/// Phrases that end an investigation with the solution revealed.
pub const GIVE_UP_PHRASES: [&str; 10] = [
    "i give up",
    "give up",
    "i don't know",
    "no idea",
    "can't figure",
    "show me the answer",
    "what's the solution",
    "i'm stuck",
    "tell me the answer",
    "reveal the solution",
];

/// Phrases that explicitly ask for a nudge.
pub const HINT_REQUEST_PHRASES: [&str; 6] = ["hint", "clue", "help", "stuck", "not sure", "any ideas"];

fn contains_any(message: &str, phrases: &[&str]) -> bool {
    let lowered = message.to_lowercase();
    phrases.iter().any(|phrase| lowered.contains(phrase))
}

/// Case-insensitive substring match against the give-up lexicon.
pub fn is_giving_up(message: &str) -> bool {
    contains_any(message, &GIVE_UP_PHRASES)
}

pub fn requests_hint(message: &str) -> bool {
    contains_any(message, &HINT_REQUEST_PHRASES)
}

/// Whether the next coaching reply should carry a hint.
///
/// `history_len` is the chat history length before this turn is appended.
pub fn hint_eligible(message: &str, history_len: usize, hints_given: u32) -> bool {
    requests_hint(message)
        || (history_len >= 4 && history_len % 4 == 0)
        || (history_len >= 8 && hints_given < 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_give_up_phrases_case_insensitive() {
        assert!(is_giving_up("I GIVE UP"));
        assert!(is_giving_up("Honestly no idea what's going on"));
        assert!(is_giving_up("ok, Show Me The Answer"));
        assert!(!is_giving_up("I think the cache is stale"));
    }

    #[test]
    fn test_give_up_matches_inside_longer_text() {
        assert!(is_giving_up("I won't give up but I'm confused"));
    }

    #[test]
    fn test_hint_request_phrases() {
        assert!(requests_hint("hint please"));
        assert!(requests_hint("Any ideas where to look?"));
        assert!(requests_hint("can you HELP"));
        assert!(!requests_hint("the queue backs up at midnight"));
    }

    #[test]
    fn test_hint_cadence_by_history_length() {
        let eligible: Vec<usize> = (0..=12).filter(|&len| hint_eligible("what's in the logs", len, 2)).collect();
        assert_eq!(eligible, vec![4, 8, 12]);
    }

    #[test]
    fn test_long_conversation_guarantees_two_hints() {
        assert!(hint_eligible("what's in the logs", 10, 0));
        assert!(hint_eligible("what's in the logs", 10, 1));
        assert!(!hint_eligible("what's in the logs", 10, 2));
        assert!(!hint_eligible("what's in the logs", 6, 0));
    }

    #[test]
    fn test_explicit_request_always_eligible() {
        assert!(hint_eligible("hint please", 0, 0));
        assert!(hint_eligible("I'm not sure", 2, 5));
    }
}
