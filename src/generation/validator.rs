//! Validation and sanitization of AI output
//!
//! The model is instructed to emit pure JSON but is not trusted to: the
//! payload is carved out between the first `{` and the last `}`, parsed,
//! and filtered item by item against the content contract. Bad items are
//! dropped, never repaired, and the engine never invents placeholder
//! content to mask a bad response.

use serde_json::Value;
use thiserror::Error;

use crate::content::{CardDraft, ContentKind, GeneratedContent, QuestionDraft};

/// Number of options every quiz question must carry
pub const OPTION_COUNT: usize = 4;

#[derive(Error, Debug)]
pub enum ValidateError {
    /// No `{ ... }` region found in the response text
    #[error("no JSON object found in response")]
    NoJson,

    /// The carved-out region is not valid JSON
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Parsed fine but the top-level array field is missing
    #[error("response has no `{0}` array")]
    MissingField(&'static str),

    /// Valid JSON, but zero usable items after filtering. Distinct from a
    /// parse failure: retrying the same prompt is unlikely to help.
    #[error("no usable items after filtering")]
    Empty,

    /// The requested kind is not produced by the generation pipeline
    #[error("content kind {0:?} is not generatable")]
    UnsupportedKind(ContentKind),
}

impl ValidateError {
    /// Whether a retry with the same prompt could plausibly succeed.
    /// Malformed output is a transient model mistake; an empty result is a
    /// considered answer.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            ValidateError::NoJson | ValidateError::Json(_) | ValidateError::MissingField(_)
        )
    }
}

/// Parse and sanitize a raw AI response into validated drafts.
pub fn validate(raw: &str, kind: ContentKind) -> Result<GeneratedContent, ValidateError> {
    let payload = extract_json(raw)?;
    let value: Value = serde_json::from_str(payload)?;

    let content = match kind {
        ContentKind::Flashcards => {
            let items = array_field(&value, "flashcards")?;
            GeneratedContent::Flashcards(sanitize_cards(items))
        }
        ContentKind::Quiz => {
            let items = array_field(&value, "questions")?;
            GeneratedContent::Quiz(sanitize_questions(items))
        }
        ContentKind::Note
        | ContentKind::Exercise
        | ContentKind::Mindmap
        | ContentKind::Summary => return Err(ValidateError::UnsupportedKind(kind)),
    };

    if content.is_empty() {
        return Err(ValidateError::Empty);
    }
    Ok(content)
}

/// Carve the JSON payload out of surrounding prose or code fences.
///
/// Substring search between the first `{` and the last `}` is fragile
/// against stray braces in free text, but matches what the model is
/// instructed to emit; anything it breaks on fails parsing and is retried
/// upstream.
fn extract_json(raw: &str) -> Result<&str, ValidateError> {
    let start = raw.find('{').ok_or(ValidateError::NoJson)?;
    let end = raw.rfind('}').ok_or(ValidateError::NoJson)?;
    if end < start {
        return Err(ValidateError::NoJson);
    }
    Ok(&raw[start..=end])
}

fn array_field<'a>(
    value: &'a Value,
    field: &'static str,
) -> Result<&'a Vec<Value>, ValidateError> {
    value
        .get(field)
        .and_then(Value::as_array)
        .ok_or(ValidateError::MissingField(field))
}

fn sanitize_cards(items: &[Value]) -> Vec<CardDraft> {
    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<CardDraft>(item.clone()) {
            Ok(draft) if !draft.front.trim().is_empty() && !draft.back.trim().is_empty() => {
                Some(draft)
            }
            Ok(_) => {
                log::warn!("Dropping flashcard with empty front or back");
                None
            }
            Err(e) => {
                log::warn!("Dropping malformed flashcard: {}", e);
                None
            }
        })
        .collect()
}

fn sanitize_questions(items: &[Value]) -> Vec<QuestionDraft> {
    items
        .iter()
        .filter_map(
            |item| match serde_json::from_value::<QuestionDraft>(item.clone()) {
                Ok(draft) => {
                    if draft.stem.trim().is_empty() {
                        log::warn!("Dropping question with empty stem");
                        None
                    } else if draft.options.len() != OPTION_COUNT {
                        log::warn!(
                            "Dropping question with {} options instead of {}",
                            draft.options.len(),
                            OPTION_COUNT
                        );
                        None
                    } else if draft.correct_answer >= OPTION_COUNT {
                        log::warn!(
                            "Dropping question with out-of-range correctAnswer {}",
                            draft.correct_answer
                        );
                        None
                    } else {
                        Some(draft)
                    }
                }
                Err(e) => {
                    log::warn!("Dropping malformed question: {}", e);
                    None
                }
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_QUESTION: &str = r#"{
        "stem": "What gas do plants absorb?",
        "options": ["Oxygen", "Carbon dioxide", "Nitrogen", "Helium"],
        "correctAnswer": 1,
        "explanation": "Photosynthesis fixes CO2.",
        "difficulty": "easy",
        "type": "recall",
        "tags": ["biology"]
    }"#;

    fn quiz_payload(questions: &[&str]) -> String {
        format!(r#"{{ "questions": [{}] }}"#, questions.join(","))
    }

    #[test]
    fn accepts_pure_json() {
        let raw = quiz_payload(&[VALID_QUESTION]);
        let content = validate(&raw, ContentKind::Quiz).unwrap();
        assert_eq!(content.len(), 1);
    }

    #[test]
    fn strips_prose_and_fences() {
        let raw = format!(
            "Sure! Here is your quiz:\n```json\n{}\n```\nLet me know if you need more.",
            quiz_payload(&[VALID_QUESTION])
        );
        let content = validate(&raw, ContentKind::Quiz).unwrap();
        assert_eq!(content.len(), 1);
    }

    #[test]
    fn drops_invalid_items_keeps_valid() {
        let _ = env_logger::builder().is_test(true).try_init();
        let three_options = r#"{
            "stem": "Broken one",
            "options": ["a", "b", "c"],
            "correctAnswer": 0
        }"#;
        let raw = quiz_payload(&[
            VALID_QUESTION,
            VALID_QUESTION,
            three_options,
            VALID_QUESTION,
            VALID_QUESTION,
        ]);
        let content = validate(&raw, ContentKind::Quiz).unwrap();
        assert_eq!(content.len(), 4);
    }

    #[test]
    fn drops_out_of_range_correct_answer() {
        let out_of_range = r#"{
            "stem": "Which index?",
            "options": ["a", "b", "c", "d"],
            "correctAnswer": 4
        }"#;
        let raw = quiz_payload(&[out_of_range, VALID_QUESTION]);
        let content = validate(&raw, ContentKind::Quiz).unwrap();
        assert_eq!(content.len(), 1);
    }

    #[test]
    fn empty_array_is_empty_error_not_parse_error() {
        let err = validate(r#"{"questions": []}"#, ContentKind::Quiz).unwrap_err();
        assert!(matches!(err, ValidateError::Empty));
        assert!(!err.is_malformed());
    }

    #[test]
    fn all_items_dropped_is_empty_error() {
        let no_back = r#"{"front": "Q", "back": "   "}"#;
        let raw = format!(r#"{{ "flashcards": [{}] }}"#, no_back);
        let err = validate(&raw, ContentKind::Flashcards).unwrap_err();
        assert!(matches!(err, ValidateError::Empty));
    }

    #[test]
    fn unparsable_text_is_malformed() {
        let err = validate("I could not generate a quiz, sorry.", ContentKind::Quiz).unwrap_err();
        assert!(matches!(err, ValidateError::NoJson));
        assert!(err.is_malformed());

        // A `{` with no closing brace never reaches the parser
        let err = validate("{ never closed", ContentKind::Quiz).unwrap_err();
        assert!(matches!(err, ValidateError::NoJson));
        assert!(err.is_malformed());

        let err = validate("{ not json at all }", ContentKind::Quiz).unwrap_err();
        assert!(matches!(err, ValidateError::Json(_)));
        assert!(err.is_malformed());
    }

    #[test]
    fn missing_array_field_is_malformed() {
        let err = validate(r#"{"cards": []}"#, ContentKind::Flashcards).unwrap_err();
        assert!(matches!(err, ValidateError::MissingField("flashcards")));
        assert!(err.is_malformed());
    }

    #[test]
    fn flashcards_parse_with_defaults() {
        let raw = r#"{"flashcards": [
            {"front": "Define osmosis", "back": "Diffusion of water across a membrane"},
            {"front": "", "back": "dropped"}
        ]}"#;
        let content = validate(raw, ContentKind::Flashcards).unwrap();
        match content {
            GeneratedContent::Flashcards(cards) => {
                assert_eq!(cards.len(), 1);
                assert_eq!(cards[0].difficulty, crate::content::Difficulty::Normal);
                assert!(cards[0].tags.is_empty());
            }
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[test]
    fn non_generatable_kind_is_rejected() {
        let err = validate("{}", ContentKind::Mindmap).unwrap_err();
        assert!(matches!(err, ValidateError::UnsupportedKind(ContentKind::Mindmap)));
    }
}
