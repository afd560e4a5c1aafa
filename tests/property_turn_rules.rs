//! Property tests for the deterministic turn rules.

use proptest::prelude::*;
use sleuth::services::hint_policy::{hint_eligible, is_giving_up, requests_hint};
use sleuth::services::solution_grader::{GradingPolicy, Rejection};

/// Lowercase words that avoid every hint and give-up phrase.
fn neutral_message() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec!["cache", "deploy", "latency", "queue", "error", "rows", "index", "timeout"]),
        1..12,
    )
    .prop_map(|words| words.join(" "))
}

proptest! {
    #[test]
    fn prop_hint_eligibility_is_deterministic(msg in ".{0,80}", len in 0usize..40, given in 0u32..6) {
        prop_assert_eq!(hint_eligible(&msg, len, given), hint_eligible(&msg, len, given));
    }

    #[test]
    fn prop_explicit_request_always_eligible(prefix in neutral_message(), len in 0usize..40, given in 0u32..6) {
        let msg = format!("{prefix} can I get a hint");
        prop_assert!(requests_hint(&msg));
        prop_assert!(hint_eligible(&msg, len, given));
    }

    #[test]
    fn prop_cadence_rule(msg in neutral_message(), len in 0usize..40, given in 0u32..6) {
        let expected = (len >= 4 && len % 4 == 0) || (len >= 8 && given < 2);
        prop_assert_eq!(hint_eligible(&msg, len, given), expected);
    }

    #[test]
    fn prop_no_hint_in_first_two_turns(msg in neutral_message(), len in 0usize..4, given in 0u32..6) {
        prop_assert!(!hint_eligible(&msg, len, given));
    }

    #[test]
    fn prop_give_up_phrase_detected_in_any_case(prefix in neutral_message(), upper in any::<bool>()) {
        let phrase = if upper { "I GIVE UP" } else { "i give up" };
        let msg = format!("{prefix} {phrase}");
        prop_assert!(is_giving_up(&msg));
    }

    #[test]
    fn prop_questions_never_reach_grading(msg in neutral_message()) {
        let question = format!("{msg}?");
        prop_assert_eq!(GradingPolicy::default().precheck(&question), Some(Rejection::Question));
    }

    #[test]
    fn prop_short_statements_never_reach_grading(msg in neutral_message()) {
        let statement = format!("{msg}.");
        let rejected = matches!(
            GradingPolicy::default().precheck(&statement),
            Some(Rejection::TooShort { .. })
        );
        prop_assert!(rejected);
    }
}
