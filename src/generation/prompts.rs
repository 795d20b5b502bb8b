//! Prompt construction for content generation
//!
//! System instructions are fixed per content kind and spell out the exact
//! JSON contract the validator enforces. The user prompt embeds a bounded
//! prefix of the source text so long documents stay inside provider
//! context limits.

use crate::content::{ContentKind, GenerationRequest, RequestedDifficulty};

/// Maximum number of source characters embedded in a prompt
pub const SOURCE_CHAR_BUDGET: usize = 12_000;

const FLASHCARD_SYSTEM_PROMPT: &str = "\
You are a flashcard author for a spaced repetition study app.
Respond with pure JSON only: no prose, no markdown fences, no commentary.
The JSON must have exactly this shape:
{ \"flashcards\": [ { \"front\": string, \"back\": string, \"difficulty\": \"easy\"|\"normal\"|\"hard\", \"tags\": string[] } ] }
Rules:
- \"front\" is a single question or term; \"back\" is the complete answer.
- Every card must be answerable from the provided source text alone.
- Never leave \"front\" or \"back\" empty.";

const QUIZ_SYSTEM_PROMPT: &str = "\
You are a quiz author for a study app.
Respond with pure JSON only: no prose, no markdown fences, no commentary.
The JSON must have exactly this shape:
{ \"questions\": [ { \"stem\": string, \"options\": string[4], \"correctAnswer\": 0|1|2|3, \"explanation\": string, \"difficulty\": \"easy\"|\"normal\"|\"hard\", \"type\": string, \"tags\": string[] } ] }
Rules:
- \"options\" must contain exactly 4 distinct answers.
- \"correctAnswer\" is the zero-based index of the correct option.
- Distractors must be plausible but unambiguously wrong.
- Every question must be answerable from the provided source text alone.";

/// Fixed system instruction for a generatable kind
pub fn system_prompt(kind: ContentKind) -> Option<&'static str> {
    match kind {
        ContentKind::Flashcards => Some(FLASHCARD_SYSTEM_PROMPT),
        ContentKind::Quiz => Some(QUIZ_SYSTEM_PROMPT),
        ContentKind::Note
        | ContentKind::Exercise
        | ContentKind::Mindmap
        | ContentKind::Summary => None,
    }
}

/// Build the user prompt for a generation request
pub fn user_prompt(request: &GenerationRequest) -> String {
    let source = truncate_source(&request.source_text, SOURCE_CHAR_BUDGET);

    let noun = match request.kind {
        ContentKind::Quiz => "multiple-choice questions",
        _ => "flashcards",
    };

    let difficulty = match request.difficulty {
        RequestedDifficulty::Easy => "easy",
        RequestedDifficulty::Normal => "normal",
        RequestedDifficulty::Hard => "hard",
        RequestedDifficulty::Mixed => "a mix of easy, normal and hard",
    };

    let mut prompt = format!(
        "Create exactly {} {} at {} difficulty from the source text below.\n",
        request.count, noun, difficulty
    );
    if !request.types.is_empty() {
        prompt.push_str(&format!("Use these content types: {}.\n", request.types.join(", ")));
    }
    prompt.push_str("\nSource text:\n");
    prompt.push_str(source);
    prompt
}

/// Truncate to at most `budget` characters, preferring a word boundary so
/// the prompt does not end mid-token.
fn truncate_source(text: &str, budget: usize) -> &str {
    if text.chars().count() <= budget {
        return text;
    }

    let hard_cut = text
        .char_indices()
        .nth(budget)
        .map(|(byte_index, _)| byte_index)
        .unwrap_or(text.len());
    let clipped = &text[..hard_cut];

    // Prefer breaking at whitespace, but not so early that most of the
    // budget is wasted
    match clipped.rfind(char::is_whitespace) {
        Some(pos) if pos > budget / 2 => &clipped[..pos],
        _ => clipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(kind: ContentKind, source: &str) -> GenerationRequest {
        GenerationRequest {
            source_text: source.to_string(),
            count: 5,
            kind,
            difficulty: RequestedDifficulty::Mixed,
            types: vec!["definition".into(), "application".into()],
            provider: "openai".into(),
            model: None,
        }
    }

    #[test]
    fn system_prompts_exist_only_for_generatable_kinds() {
        assert!(system_prompt(ContentKind::Flashcards).is_some());
        assert!(system_prompt(ContentKind::Quiz).is_some());
        assert!(system_prompt(ContentKind::Note).is_none());
        assert!(system_prompt(ContentKind::Summary).is_none());
    }

    #[test]
    fn user_prompt_carries_parameters() {
        let prompt = user_prompt(&request(ContentKind::Quiz, "Photosynthesis turns light into sugar."));
        assert!(prompt.contains("exactly 5 multiple-choice questions"));
        assert!(prompt.contains("definition, application"));
        assert!(prompt.contains("Photosynthesis"));
    }

    #[test]
    fn short_source_is_untouched() {
        let text = "short text";
        assert_eq!(truncate_source(text, SOURCE_CHAR_BUDGET), text);
    }

    #[test]
    fn long_source_is_cut_on_a_word_boundary() {
        let text = "word ".repeat(5_000);
        let cut = truncate_source(&text, SOURCE_CHAR_BUDGET);
        assert!(cut.chars().count() <= SOURCE_CHAR_BUDGET);
        assert!(!cut.ends_with(char::is_whitespace));
        assert!(cut.ends_with("word"));
    }

    #[test]
    fn truncation_respects_multibyte_boundaries() {
        let text = "ünïcödé ".repeat(3_000);
        let cut = truncate_source(&text, SOURCE_CHAR_BUDGET);
        assert!(cut.chars().count() <= SOURCE_CHAR_BUDGET);
        assert!(text.starts_with(cut));
    }
}
