//! Prompt builders and fixed reply texts.

use crate::domain::models::{EvidenceSource, Investigation, InvestigationVariant};

/// Reply when the oracle could not be reached during a turn.
pub const FALLBACK_REPLY: &str = "I'm having trouble processing that. Can you try rephrasing your question?";

/// Reply for a user who gives up; reveals the solution.
pub fn give_up_reply(solution: &str) -> String {
    format!(
        "No worries! Here's what actually happened:\n\n{solution}\n\n\
         This was a great learning opportunity - these kinds of issues help us understand our system better!"
    )
}

/// Reply for a correct explanation; reveals the solution.
pub fn solved_reply(solution: &str) -> String {
    format!(
        "🎉 Excellent work! You've solved it!\n\n{solution}\n\n\
         Great investigation skills - this is exactly how our team approaches these kinds of issues!"
    )
}

/// Instructions for finding one past issue and framing it as a mystery.
pub fn synthesis_prompt(topic: Option<&str>, variant: InvestigationVariant, tool_budget: u32) -> String {
    let subject = topic
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("any interesting technical issue or bug");
    let [codebase, tickets, chat] = EvidenceSource::ALL.map(|s| s.tool_name());

    let mut prompt = String::new();
    prompt.push_str("MISSION: Find an interesting past issue from this team's history that would make a great investigative lesson.\n\n");
    prompt.push_str(&format!(
        "CRITICAL TOOL LIMIT: You have a MAXIMUM of {tool_budget} tool calls in total across {tickets}, {codebase} and {chat}. \
         Once they are used, further calls return nothing useful and you MUST produce the final answer. Plan your searches.\n\n"
    ));

    prompt.push_str("SEARCH PLAN (stay within the limit):\n");
    prompt.push_str(&format!("1. {tickets} (3-4 searches): \"{subject}\"; then \"bug\", \"error\", \"incident\"; then \"fix\", \"resolved\".\n"));
    prompt.push_str(&format!("2. {codebase} (2-3 searches): \"{subject}\"; then technical terms found in the tickets.\n"));
    prompt.push_str(&format!("3. {chat} (1-2 searches): \"{subject}\"; then \"broken\", \"help\", \"outage\".\n\n"));

    prompt.push_str("SELECT AN ISSUE THAT IS:\n");
    prompt.push_str("✅ Technical and specific, not just a feature request\n");
    prompt.push_str("✅ Clearly described, with a clear resolution\n");
    prompt.push_str("✅ Interesting to debug or investigate\n");
    prompt.push_str("✅ Discussed by the team while it was being solved\n");
    prompt.push_str("✅ Educational about how this system works\n\n");
    prompt.push_str("AVOID:\n");
    prompt.push_str("❌ Typos and trivial fixes\n");
    prompt.push_str("❌ Issues that were never resolved\n");
    prompt.push_str("❌ Pure feature requests without a technical challenge\n");
    prompt.push_str("❌ Issues too complex to work through in one lesson\n\n");

    let (description_key, context_key) = match variant {
        InvestigationVariant::Standalone => ("description", "context"),
        InvestigationVariant::Slide => ("problem_description", "problem_context"),
    };

    prompt.push_str("OUTPUT: respond with a single JSON object and nothing else:\n{\n");
    prompt.push_str("  \"title\": \"Short, engaging title (max 60 characters)\",\n");
    prompt.push_str(&format!(
        "  \"{description_key}\": \"The problem as it first appeared: symptoms, error messages, unexpected behaviour. 2-3 sentences. Do NOT reveal the cause or the fix.\",\n"
    ));
    prompt.push_str(&format!(
        "  \"{context_key}\": \"Background from your searches: relevant code, architecture, components, team discussion. Enough to investigate without giving the answer away. 3-4 sentences.\",\n"
    ));
    prompt.push_str("  \"solution\": \"What was actually wrong, why it caused the symptoms, and the specific fix. Revealed only at the end. 2-3 sentences.\"");
    match variant {
        InvestigationVariant::Standalone => {
            prompt.push_str(",\n  \"search_summary\": \"One sentence on what the searches turned up.\"\n}\n\n");
        }
        InvestigationVariant::Slide => {
            prompt.push_str(",\n  \"hints\": [\"2-3 progressively stronger nudges that never state the answer\"]\n}\n\n");
        }
    }

    prompt.push_str(&format!(
        "IMPORTANT: The {description_key} must read as a mystery to be solved. It must not say what caused the problem or how it was fixed."
    ));
    prompt
}

/// Strict CORRECT/INCORRECT classification of a user's explanation.
pub fn grading_prompt(problem_description: &str, solution: &str, message: &str, min_words: usize) -> String {
    let mut prompt = String::new();
    prompt.push_str("TASK: Decide whether the user has FULLY SOLVED this problem with a complete understanding.\n\n");
    prompt.push_str(&format!("PROBLEM:\n{problem_description}\n\n"));
    prompt.push_str(&format!("ACTUAL SOLUTION:\n{solution}\n\n"));
    prompt.push_str(&format!("USER'S ANSWER:\n{message}\n\n"));

    prompt.push_str("ALL OF THESE MUST HOLD:\n");
    prompt.push_str("1. The user identifies the exact root cause given in the solution.\n");
    prompt.push_str("2. They explain why it caused the problem.\n");
    prompt.push_str("3. They describe the specific fix that was implemented.\n");
    prompt.push_str("4. They show understanding of the technical details.\n");
    prompt.push_str("5. It is a complete explanation, not a question or a partial insight.\n");
    prompt.push_str(&format!("6. It is at least {min_words} words long and has multiple sentences.\n"));
    prompt.push_str("7. Technical terminology is used correctly.\n\n");

    prompt.push_str("GUIDELINES:\n");
    prompt.push_str("- Questions are never solutions.\n");
    prompt.push_str("- Guesses such as \"maybe it's...\" are not solutions.\n");
    prompt.push_str("- Both the problem and the fix must be explained.\n");
    prompt.push_str("- Be extremely strict; when in doubt answer INCORRECT.\n\n");

    prompt.push_str("INCORRECT examples: \"What error messages are we seeing?\", \"Is it a database issue?\", \"The API seems broken\".\n");
    prompt.push_str("CORRECT shape: \"The root cause was [specific issue], which happened because [mechanism]. The fix was [specific change], which resolved it by [how].\"\n\n");
    prompt.push_str("Respond with exactly one word: CORRECT or INCORRECT");
    prompt
}

/// Socratic coaching reply that must not give the answer away.
pub fn coaching_prompt(
    investigation: &Investigation,
    message: &str,
    provide_hint: bool,
    variant: InvestigationVariant,
    history_window: usize,
) -> String {
    let recent = investigation.recent_history(history_window);
    let history = if recent.is_empty() {
        "No previous messages".to_string()
    } else {
        serde_json::to_string_pretty(recent).unwrap_or_else(|_| "No previous messages".to_string())
    };

    let mut prompt = String::new();
    prompt.push_str("CONTEXT: You are helping a developer investigate this issue.\n\n");
    prompt.push_str(&format!("PROBLEM: {}\n\n", investigation.problem_description));
    prompt.push_str(&format!("BACKGROUND: {}\n\n", investigation.problem_context));
    prompt.push_str(&format!("ACTUAL SOLUTION (DO NOT REVEAL): {}\n\n", investigation.solution));
    prompt.push_str(&format!("USER'S LATEST MESSAGE: {message}\n\n"));
    prompt.push_str(&format!("HINTS GIVEN SO FAR: {}\n\n", investigation.hints_given));
    prompt.push_str(&format!("CHAT HISTORY: {history}\n\n"));

    if provide_hint {
        prompt.push_str("PROVIDE A HINT: give a subtle hint that moves them toward the solution without stating it.\n\n");
    } else {
        prompt.push_str("NO HINT: respond helpfully but do not give away the solution.\n\n");
    }

    match variant {
        InvestigationVariant::Standalone => {
            prompt.push_str("COACHING:\n");
            prompt.push_str("- Act like a senior developer who wants them to learn by investigating.\n");
            prompt.push_str("- When they ask for facts (errors, logs, code), give concrete details from the background.\n");
            prompt.push_str("- Suggest specific investigation approaches and ask probing follow-up questions.\n");
            prompt.push_str("- Acknowledge good reasoning and redirect when they are off track.\n");
            prompt.push_str("- Do not accept bare guesses; ask for evidence and reasoning.\n\n");
            prompt.push_str("TONE: encouraging and collaborative, like a teammate who values thorough investigation.\n\n");
            prompt.push_str("RESPOND WITH ONLY YOUR MESSAGE, NO LABELS OR FORMATTING.");
        }
        InvestigationVariant::Slide => {
            prompt.push_str("FORMAT:\n");
            prompt.push_str("- MAXIMUM 2-3 sentences.\n");
            prompt.push_str("- Answer their exact question; be specific but concise.\n");
            prompt.push_str("- At most one focused follow-up question.\n\n");
            prompt.push_str("TONE: direct and supportive, like a busy teammate.\n\n");
            prompt.push_str("RESPOND WITH ONLY YOUR MESSAGE, NO LABELS OR FORMATTING, MAXIMUM 2-3 SENTENCES.");
        }
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::SynthesizedProblem;

    fn investigation() -> Investigation {
        Investigation::from_problem(SynthesizedProblem {
            title: "t".to_string(),
            problem_description: "Uploads hang at 99%.".to_string(),
            problem_context: "nginx client_max_body_size is 10m.".to_string(),
            solution: "SECRET-ROOT-CAUSE".to_string(),
            hints: vec![],
        })
    }

    #[test]
    fn test_terminal_replies_embed_solution() {
        assert!(give_up_reply("the fix").contains("\n\nthe fix\n\n"));
        assert!(solved_reply("the fix").starts_with("🎉 Excellent work!"));
    }

    #[test]
    fn test_synthesis_prompt_shapes() {
        let standalone = synthesis_prompt(Some("null pointer bug"), InvestigationVariant::Standalone, 8);
        assert!(standalone.contains("MAXIMUM of 8 tool calls"));
        assert!(standalone.contains("\"null pointer bug\""));
        assert!(standalone.contains("\"description\""));
        assert!(standalone.contains("\"search_summary\""));
        assert!(!standalone.contains("\"hints\""));

        let slide = synthesis_prompt(None, InvestigationVariant::Slide, 8);
        assert!(slide.contains("\"problem_description\""));
        assert!(slide.contains("\"hints\""));
        assert!(slide.contains("any interesting technical issue or bug"));
    }

    #[test]
    fn test_synthesis_prompt_names_every_tool() {
        let prompt = synthesis_prompt(None, InvestigationVariant::Standalone, 8);
        for source in EvidenceSource::ALL {
            assert!(prompt.contains(source.tool_name()));
        }
    }

    #[test]
    fn test_coaching_prompt_variants() {
        let inv = investigation();
        let slide = coaching_prompt(&inv, "what logs?", true, InvestigationVariant::Slide, 5);
        assert!(slide.contains("PROVIDE A HINT"));
        assert!(slide.contains("MAXIMUM 2-3 sentences"));
        assert!(slide.contains("No previous messages"));

        let standalone = coaching_prompt(&inv, "what logs?", false, InvestigationVariant::Standalone, 5);
        assert!(standalone.contains("NO HINT"));
        assert!(standalone.contains("senior developer"));
    }

    #[test]
    fn test_grading_prompt_demands_single_word() {
        let prompt = grading_prompt("desc", "sol", "answer", 50);
        assert!(prompt.contains("at least 50 words"));
        assert!(prompt.ends_with("CORRECT or INCORRECT"));
    }
}
